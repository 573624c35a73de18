//! Book handlers
//!
//! Catalog listing, search and staff maintenance of titles.

use axum::{extract::State, Json};
use lms_core::BookId;
use lms_service::dto::{
    BookListQuery, BookResponse, CreateBookRequest, PageResponse, SearchQuery, UpdateBookRequest,
};
use lms_service::BookService;

use crate::extractors::{AuthUser, IdPath, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// List books with search, filters, sort and paging
///
/// GET /books
pub async fn list_books(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<BookListQuery>,
) -> ApiResult<Json<PageResponse<BookResponse>>> {
    let service = BookService::new(state.service_context());
    let response = service.list(auth.context(), query).await?;
    Ok(Json(response))
}

/// Active titles with copies on the shelf
///
/// GET /books/search?q=
pub async fn search_books(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ApiResult<Json<Vec<BookResponse>>> {
    let service = BookService::new(state.service_context());
    let response = service.search_available(auth.context(), query).await?;
    Ok(Json(response))
}

/// Add a title
///
/// POST /books
pub async fn create_book(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateBookRequest>,
) -> ApiResult<Created<Json<BookResponse>>> {
    let service = BookService::new(state.service_context());
    let response = service.create(auth.context(), request).await?;
    Ok(Created(Json(response)))
}

/// GET /books/{book_id}
pub async fn get_book(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(book_id): IdPath<BookId>,
) -> ApiResult<Json<BookResponse>> {
    let service = BookService::new(state.service_context());
    let response = service.get(auth.context(), book_id).await?;
    Ok(Json(response))
}

/// Partial update, including cover replacement or removal
///
/// PATCH /books/{book_id}
pub async fn update_book(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(book_id): IdPath<BookId>,
    ValidatedJson(request): ValidatedJson<UpdateBookRequest>,
) -> ApiResult<Json<BookResponse>> {
    let service = BookService::new(state.service_context());
    let response = service.update(auth.context(), book_id, request).await?;
    Ok(Json(response))
}

/// DELETE /books/{book_id}
pub async fn delete_book(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(book_id): IdPath<BookId>,
) -> ApiResult<NoContent> {
    let service = BookService::new(state.service_context());
    service.delete(auth.context(), book_id).await?;
    Ok(NoContent)
}
