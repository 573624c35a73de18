//! Book service
//!
//! Catalog listing and search, book creation, partial updates and deletion,
//! including cover image upload and cleanup.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lms_core::{
    Book, BookId, BookQuery, CategoryId, CoverUpload, DomainError, LibraryId, NewBook,
    RequestContext,
};
use tracing::{info, instrument, warn};

use crate::dto::{
    BookListQuery, BookResponse, CreateBookRequest, PageResponse, SearchQuery, UpdateBookRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Book service
pub struct BookService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BookService<'a> {
    /// Create a new BookService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Paginated catalog listing
    #[instrument(skip(self, query))]
    pub async fn list(
        &self,
        rc: &RequestContext,
        query: BookListQuery,
    ) -> ServiceResult<PageResponse<BookResponse>> {
        let page = query.page();
        let query = BookQuery {
            search: query.search,
            category_id: query.category_id,
            status: query.status,
            sort: query.sort.into(),
            page,
        };
        let books = self.ctx.book_repo().list(rc.library_id, &query).await?;
        Ok(PageResponse::from_page(books, BookResponse::from))
    }

    /// Get one book of the caller's library
    #[instrument(skip(self))]
    pub async fn get(&self, rc: &RequestContext, book_id: BookId) -> ServiceResult<BookResponse> {
        let book = self.find(rc.library_id, book_id).await?;
        Ok(BookResponse::from(book))
    }

    /// Active books with copies on the shelf, for the borrow desk lookup
    #[instrument(skip(self))]
    pub async fn search_available(
        &self,
        rc: &RequestContext,
        query: SearchQuery,
    ) -> ServiceResult<Vec<BookResponse>> {
        let books = self
            .ctx
            .book_repo()
            .search_available(rc.library_id, query.q.trim(), query.limit())
            .await?;
        Ok(books.into_iter().map(BookResponse::from).collect())
    }

    /// Add a title to the catalog
    #[instrument(skip(self, request), fields(book_code = %request.book_code))]
    pub async fn create(
        &self,
        rc: &RequestContext,
        request: CreateBookRequest,
    ) -> ServiceResult<BookResponse> {
        rc.require_staff()?;

        let book_code = request.book_code.trim().to_string();
        if self
            .ctx
            .book_repo()
            .code_exists(rc.library_id, &book_code)
            .await?
        {
            return Err(DomainError::BookCodeExists(book_code).into());
        }
        if let Some(category_id) = request.category_id {
            self.ensure_category(rc.library_id, category_id).await?;
        }

        // Decode before touching storage so a bad upload never leaves a file behind
        let upload = request
            .cover_image
            .as_deref()
            .map(|data| self.decode_cover(data))
            .transpose()?;
        let cover_image = match &upload {
            Some(upload) => Some(self.ctx.covers().save(&book_code, upload).await?),
            None => None,
        };

        let new_book = NewBook {
            library_id: rc.library_id,
            book_code,
            title: request.title.trim().to_string(),
            author_name: request.author_name.trim().to_string(),
            isbn: request.isbn.trim().to_string(),
            category_id: request.category_id,
            total_copies: request.total_copies,
            status: request.status.unwrap_or_default(),
            cover_image,
        };

        let book = match self.ctx.book_repo().create(&new_book).await {
            Ok(book) => book,
            Err(e) => {
                if let Some(path) = &new_book.cover_image {
                    self.discard_cover(path).await;
                }
                return Err(e.into());
            }
        };

        info!(book_id = %book.id, title = %book.title, "Book created");

        self.refresh_book_count(rc.library_id).await;
        self.ctx
            .log_activity(
                rc,
                "book_created",
                format!("Added book '{}' ({})", book.title, book.book_code),
            )
            .await;

        Ok(BookResponse::from(book))
    }

    /// Replace any subset of a book's fields. Changing `total_copies` shifts
    /// the stored `available_copies` by the same amount; loans and returns
    /// that land while the edit is in flight are kept.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        rc: &RequestContext,
        book_id: BookId,
        request: UpdateBookRequest,
    ) -> ServiceResult<BookResponse> {
        rc.require_staff()?;

        let mut book = self.find(rc.library_id, book_id).await?;
        let old_cover = book.cover_image.clone();

        if let Some(code) = request.book_code {
            let code = code.trim().to_string();
            if code != book.book_code {
                if self
                    .ctx
                    .book_repo()
                    .code_exists(rc.library_id, &code)
                    .await?
                {
                    return Err(DomainError::BookCodeExists(code).into());
                }
                book.book_code = code;
            }
        }
        if let Some(title) = request.title {
            book.title = title.trim().to_string();
        }
        if let Some(author_name) = request.author_name {
            book.author_name = author_name.trim().to_string();
        }
        if let Some(isbn) = request.isbn {
            book.isbn = isbn.trim().to_string();
        }
        if let Some(category_id) = request.category_id {
            self.ensure_category(rc.library_id, category_id).await?;
            book.category_id = Some(category_id);
        }
        if let Some(status) = request.status {
            book.status = status;
        }
        // Checked against the locked row when the update is written
        if let Some(total) = request.total_copies {
            book.total_copies = total;
        }

        let upload = request
            .cover_image
            .as_deref()
            .map(|data| self.decode_cover(data))
            .transpose()?;
        let new_cover = match &upload {
            Some(upload) => Some(self.ctx.covers().save(&book.book_code, upload).await?),
            None => None,
        };
        if new_cover.is_some() {
            book.cover_image.clone_from(&new_cover);
        } else if request.remove_cover {
            book.cover_image = None;
        }

        let book = match self.ctx.book_repo().update(&book).await {
            Ok(book) => book,
            Err(e) => {
                if let Some(path) = &new_cover {
                    self.discard_cover(path).await;
                }
                return Err(e.into());
            }
        };

        // The row no longer points at the old file
        if let Some(old) = old_cover.filter(|old| book.cover_image.as_ref() != Some(old)) {
            self.discard_cover(&old).await;
        }

        info!(book_id = %book.id, "Book updated");
        self.ctx
            .log_activity(
                rc,
                "book_updated",
                format!("Updated book '{}' ({})", book.title, book.book_code),
            )
            .await;

        Ok(BookResponse::from(book))
    }

    /// Delete a book. Refused while copies are out on loan; the cover file,
    /// activity entry and book count are handled after the row is gone.
    #[instrument(skip(self))]
    pub async fn delete(&self, rc: &RequestContext, book_id: BookId) -> ServiceResult<()> {
        rc.require_staff()?;

        let book = self.ctx.book_repo().delete(rc.library_id, book_id).await?;

        info!(book_id = %book.id, "Book deleted");

        if let Some(path) = &book.cover_image {
            self.discard_cover(path).await;
        }
        self.ctx
            .log_activity(
                rc,
                "book_deleted",
                format!("Deleted book '{}' ({})", book.title, book.book_code),
            )
            .await;
        self.refresh_book_count(rc.library_id).await;

        Ok(())
    }

    // === Helpers ===

    async fn find(&self, library_id: LibraryId, book_id: BookId) -> ServiceResult<Book> {
        self.ctx
            .book_repo()
            .find_by_id(library_id, book_id)
            .await?
            .ok_or_else(|| DomainError::BookNotFound(Some(book_id)).into())
    }

    async fn ensure_category(
        &self,
        library_id: LibraryId,
        category_id: CategoryId,
    ) -> ServiceResult<()> {
        self.ctx
            .category_repo()
            .find_by_id(library_id, category_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::CategoryNotFound(category_id).into())
    }

    /// Accepts raw base64 or a `data:image/...;base64,` URL
    fn decode_cover(&self, data: &str) -> Result<CoverUpload, DomainError> {
        let encoded = data
            .split_once(";base64,")
            .map_or(data, |(_, payload)| payload)
            .trim();
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|_| DomainError::InvalidCover("Cover image is not valid base64".to_string()))?;
        CoverUpload::new(bytes, self.ctx.settings().max_cover_bytes)
    }

    async fn discard_cover(&self, path: &str) {
        if let Err(e) = self.ctx.covers().remove(path).await {
            warn!(path, error = %e, "Failed to remove cover image");
        }
    }

    async fn refresh_book_count(&self, library_id: LibraryId) {
        if let Err(e) = self.ctx.library_repo().refresh_book_count(library_id).await {
            warn!(library_id = %library_id, error = %e, "Failed to refresh library book count");
        }
    }
}

