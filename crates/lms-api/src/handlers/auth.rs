//! Authentication handlers
//!
//! Login plus the emailed setup and password reset flows. None of these
//! routes require a bearer token.

use axum::{extract::State, Json};
use lms_service::dto::{
    AuthResponse, CompleteSetupRequest, ConfirmPasswordResetRequest, LoginRequest,
    MessageResponse, PasswordResetRequest,
};
use lms_service::AuthService;

use crate::extractors::ValidatedJson;
use crate::response::ApiResult;
use crate::state::AppState;

/// Exchange email and password for an access token
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.login(request).await?;
    Ok(Json(response))
}

/// Set the first password from an emailed setup link
///
/// POST /auth/setup
pub async fn complete_setup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CompleteSetupRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.complete_setup(request).await?;
    Ok(Json(response))
}

/// Email a reset link. Answers the same whether or not the address exists.
///
/// POST /auth/password-reset
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PasswordResetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.request_password_reset(request).await?;
    Ok(Json(response))
}

/// POST /auth/password-reset/confirm
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ConfirmPasswordResetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.reset_password(request).await?;
    Ok(Json(response))
}
