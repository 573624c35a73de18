//! Category handlers

use axum::{extract::State, Json};
use lms_service::dto::{CategoryResponse, CreateCategoryRequest};
use lms_service::CategoryService;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /categories
pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let service = CategoryService::new(state.service_context());
    let response = service.list(auth.context()).await?;
    Ok(Json(response))
}

/// POST /categories
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateCategoryRequest>,
) -> ApiResult<Created<Json<CategoryResponse>>> {
    let service = CategoryService::new(state.service_context());
    let response = service.create(auth.context(), request).await?;
    Ok(Created(Json(response)))
}
