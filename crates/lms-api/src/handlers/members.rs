//! Member handlers
//!
//! Staff maintenance of library accounts. Members may read their own record.

use axum::{extract::State, Json};
use lms_core::UserId;
use lms_service::dto::{
    CreateMemberRequest, MemberDetailResponse, MemberListQuery, MemberResponse, MessageResponse,
    PageResponse, SearchQuery, UpdateMemberRequest,
};
use lms_service::MemberService;

use crate::extractors::{AuthUser, IdPath, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<MemberListQuery>,
) -> ApiResult<Json<PageResponse<MemberResponse>>> {
    let service = MemberService::new(state.service_context());
    let response = service.list(auth.context(), query).await?;
    Ok(Json(response))
}

/// Active accounts matching a name, username or member code
///
/// GET /members/search?q=
pub async fn search_members(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let service = MemberService::new(state.service_context());
    let response = service.search_active(auth.context(), query).await?;
    Ok(Json(response))
}

/// Create an account and email its setup link
///
/// POST /members
pub async fn create_member(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateMemberRequest>,
) -> ApiResult<Created<Json<MemberResponse>>> {
    let service = MemberService::new(state.service_context());
    let response = service.create(auth.context(), request).await?;
    Ok(Created(Json(response)))
}

/// GET /members/{member_id}
pub async fn get_member(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(member_id): IdPath<UserId>,
) -> ApiResult<Json<MemberDetailResponse>> {
    let service = MemberService::new(state.service_context());
    let response = service.get(auth.context(), member_id).await?;
    Ok(Json(response))
}

/// PATCH /members/{member_id}
pub async fn update_member(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(member_id): IdPath<UserId>,
    ValidatedJson(request): ValidatedJson<UpdateMemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let service = MemberService::new(state.service_context());
    let response = service.update(auth.context(), member_id, request).await?;
    Ok(Json(response))
}

/// Deactivate an account
///
/// DELETE /members/{member_id}
pub async fn delete_member(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(member_id): IdPath<UserId>,
) -> ApiResult<NoContent> {
    let service = MemberService::new(state.service_context());
    service.delete(auth.context(), member_id).await?;
    Ok(NoContent)
}

/// POST /members/{member_id}/resend-setup
pub async fn resend_setup(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(member_id): IdPath<UserId>,
) -> ApiResult<Json<MessageResponse>> {
    let service = MemberService::new(state.service_context());
    let response = service.resend_setup(auth.context(), member_id).await?;
    Ok(Json(response))
}
