//! Borrowing handlers
//!
//! Lending, renewal and return of copies.

use axum::{extract::State, Json};
use lms_core::BorrowingId;
use lms_service::dto::{
    BorrowRequest, BorrowResponse, BorrowingListQuery, BorrowingResponse, PageResponse,
    RenewRequest,
};
use lms_service::BorrowingService;

use crate::extractors::{AuthUser, IdPath, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Loans visible to the caller. Members only see their own.
///
/// GET /borrowings
pub async fn list_borrowings(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<BorrowingListQuery>,
) -> ApiResult<Json<PageResponse<BorrowingResponse>>> {
    let service = BorrowingService::new(state.service_context());
    let response = service.list(auth.context(), query).await?;
    Ok(Json(response))
}

/// Lend a copy to a member
///
/// POST /borrowings
pub async fn borrow_book(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<BorrowRequest>,
) -> ApiResult<Created<Json<BorrowResponse>>> {
    let service = BorrowingService::new(state.service_context());
    let response = service.borrow(auth.context(), request).await?;
    Ok(Created(Json(response)))
}

/// GET /borrowings/{borrowing_id}
pub async fn get_borrowing(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(borrowing_id): IdPath<BorrowingId>,
) -> ApiResult<Json<BorrowingResponse>> {
    let service = BorrowingService::new(state.service_context());
    let response = service.get(auth.context(), borrowing_id).await?;
    Ok(Json(response))
}

/// POST /borrowings/{borrowing_id}/renew
pub async fn renew_borrowing(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(borrowing_id): IdPath<BorrowingId>,
    ValidatedJson(request): ValidatedJson<RenewRequest>,
) -> ApiResult<Json<BorrowingResponse>> {
    let service = BorrowingService::new(state.service_context());
    let response = service.renew(auth.context(), borrowing_id, request).await?;
    Ok(Json(response))
}

/// POST /borrowings/{borrowing_id}/return
pub async fn return_borrowing(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(borrowing_id): IdPath<BorrowingId>,
) -> ApiResult<Json<BorrowingResponse>> {
    let service = BorrowingService::new(state.service_context());
    let response = service.return_book(auth.context(), borrowing_id).await?;
    Ok(Json(response))
}
