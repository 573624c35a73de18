//! Activity feed handler

use axum::{extract::State, Json};
use lms_service::dto::{ActivityQuery, ActivityResponse};
use lms_service::ActivityService;

use crate::extractors::{AuthUser, QueryParams};
use crate::response::ApiResult;
use crate::state::AppState;

/// Recent staff-visible actions in the caller's library
///
/// GET /activity?limit=
pub async fn recent_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ActivityQuery>,
) -> ApiResult<Json<Vec<ActivityResponse>>> {
    let service = ActivityService::new(state.service_context());
    let response = service.recent(auth.context(), query).await?;
    Ok(Json(response))
}
