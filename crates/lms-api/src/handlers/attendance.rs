//! Attendance handlers
//!
//! Front-desk check-in/out and the daily sheet.

use axum::{extract::State, Json};
use lms_core::UserId;
use lms_service::dto::{
    AttendanceDateQuery, AttendanceResponse, DailyAttendanceResponse, HistoryQuery,
    MessageResponse,
};
use lms_service::AttendanceService;

use crate::extractors::{AuthUser, IdPath, QueryParams, ValidatedQuery};
use crate::response::ApiResult;
use crate::state::AppState;

/// Daily sheet, defaulting to today on the library clock
///
/// GET /attendance?date=
pub async fn daily_attendance(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<AttendanceDateQuery>,
) -> ApiResult<Json<DailyAttendanceResponse>> {
    let service = AttendanceService::new(state.service_context());
    let response = service.daily(auth.context(), query).await?;
    Ok(Json(response))
}

/// POST /attendance/{member_id}/check-in
pub async fn check_in(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(member_id): IdPath<UserId>,
) -> ApiResult<Json<AttendanceResponse>> {
    let service = AttendanceService::new(state.service_context());
    let response = service.check_in(auth.context(), member_id).await?;
    Ok(Json(response))
}

/// POST /attendance/{member_id}/check-out
pub async fn check_out(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(member_id): IdPath<UserId>,
) -> ApiResult<Json<AttendanceResponse>> {
    let service = AttendanceService::new(state.service_context());
    let response = service.check_out(auth.context(), member_id).await?;
    Ok(Json(response))
}

/// Clear today's record so the member can check in again
///
/// POST /attendance/{member_id}/reset
pub async fn reset_attendance(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(member_id): IdPath<UserId>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AttendanceService::new(state.service_context());
    let response = service.reset(auth.context(), member_id).await?;
    Ok(Json(response))
}

/// GET /attendance/{member_id}/history?from=&to=
pub async fn attendance_history(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(member_id): IdPath<UserId>,
    ValidatedQuery(query): ValidatedQuery<HistoryQuery>,
) -> ApiResult<Json<Vec<AttendanceResponse>>> {
    let service = AttendanceService::new(state.service_context());
    let response = service.history(auth.context(), member_id, query).await?;
    Ok(Json(response))
}
