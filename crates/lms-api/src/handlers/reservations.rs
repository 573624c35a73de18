//! Reservation handlers
//!
//! Holds placed by members and worked through by staff.

use axum::{extract::State, Json};
use lms_core::ReservationId;
use lms_service::dto::{
    ApproveReservationRequest, CreateReservationRequest, ExpireResponse, PageResponse,
    RejectReservationRequest, ReservationListQuery, ReservationResponse,
};
use lms_service::ReservationService;

use crate::extractors::{AuthUser, IdPath, OptionalValidatedJson, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /reservations
pub async fn list_reservations(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ReservationListQuery>,
) -> ApiResult<Json<PageResponse<ReservationResponse>>> {
    let service = ReservationService::new(state.service_context());
    let response = service.list(auth.context(), query).await?;
    Ok(Json(response))
}

/// POST /reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> ApiResult<Created<Json<ReservationResponse>>> {
    let service = ReservationService::new(state.service_context());
    let response = service.create(auth.context(), request).await?;
    Ok(Created(Json(response)))
}

/// GET /reservations/{reservation_id}
pub async fn get_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(reservation_id): IdPath<ReservationId>,
) -> ApiResult<Json<ReservationResponse>> {
    let service = ReservationService::new(state.service_context());
    let response = service.get(auth.context(), reservation_id).await?;
    Ok(Json(response))
}

/// Approve a pending hold. The body is optional.
///
/// POST /reservations/{reservation_id}/approve
pub async fn approve_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(reservation_id): IdPath<ReservationId>,
    OptionalValidatedJson(request): OptionalValidatedJson<ApproveReservationRequest>,
) -> ApiResult<Json<ReservationResponse>> {
    let service = ReservationService::new(state.service_context());
    let response = service
        .approve(auth.context(), reservation_id, request.unwrap_or_default())
        .await?;
    Ok(Json(response))
}

/// POST /reservations/{reservation_id}/reject
pub async fn reject_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(reservation_id): IdPath<ReservationId>,
    ValidatedJson(request): ValidatedJson<RejectReservationRequest>,
) -> ApiResult<Json<ReservationResponse>> {
    let service = ReservationService::new(state.service_context());
    let response = service.reject(auth.context(), reservation_id, request).await?;
    Ok(Json(response))
}

/// POST /reservations/{reservation_id}/fulfill
pub async fn fulfill_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(reservation_id): IdPath<ReservationId>,
) -> ApiResult<Json<ReservationResponse>> {
    let service = ReservationService::new(state.service_context());
    let response = service.fulfill(auth.context(), reservation_id).await?;
    Ok(Json(response))
}

/// POST /reservations/{reservation_id}/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(reservation_id): IdPath<ReservationId>,
) -> ApiResult<Json<ReservationResponse>> {
    let service = ReservationService::new(state.service_context());
    let response = service.cancel(auth.context(), reservation_id).await?;
    Ok(Json(response))
}

/// Expire approved holds whose pickup window has passed
///
/// POST /reservations/expire
pub async fn expire_reservations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ExpireResponse>> {
    let service = ReservationService::new(state.service_context());
    let response = service.expire_stale(auth.context()).await?;
    Ok(Json(response))
}
