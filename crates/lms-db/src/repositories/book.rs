//! PostgreSQL implementation of BookRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use lms_core::entities::{Book, NewBook};
use lms_core::error::DomainError;
use lms_core::traits::{BookQuery, BookRepository, BookSort, RepoResult};
use lms_core::value_objects::{BookId, LibraryId, Page};

use crate::mappers::map_all;
use crate::models::BookModel;

use super::borrowing::lock_book;
use super::error::{book_not_found, map_db_error, map_unique_violation};
use super::search::like_pattern;

const BOOK_COLUMNS: &str = "id, library_id, book_code, title, author_name, isbn, category_id, \
     total_copies, available_copies, status, cover_image, created_at, updated_at";

/// PostgreSQL implementation of BookRepository
#[derive(Clone)]
pub struct PgBookRepository {
    pool: PgPool,
}

impl PgBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn sort_key(sort: BookSort) -> &'static str {
    match sort {
        BookSort::Title => "title",
        BookSort::Author => "author",
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, library_id: LibraryId, id: BookId) -> RepoResult<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1 AND library_id = $2");
        let result = sqlx::query_as::<_, BookModel>(&sql)
            .bind(id.into_inner())
            .bind(library_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Book::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn code_exists(&self, library_id: LibraryId, book_code: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM books WHERE library_id = $1 AND book_code = $2)
            ",
        )
        .bind(library_id.into_inner())
        .bind(book_code)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list(&self, library_id: LibraryId, query: &BookQuery) -> RepoResult<Page<Book>> {
        let pattern = like_pattern(query.search.as_deref());
        let category = query.category_id.map(|c| c.into_inner());
        let status = query.status.map(|s| s.as_str());

        let filter = r"
            WHERE library_id = $1
              AND ($2::TEXT IS NULL OR title ILIKE $2 OR isbn ILIKE $2 OR book_code ILIKE $2)
              AND ($3::BIGINT IS NULL OR category_id = $3)
              AND ($4::TEXT IS NULL OR status = $4)
        ";

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM books {filter}"))
            .bind(library_id.into_inner())
            .bind(&pattern)
            .bind(category)
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books {filter} \
             ORDER BY CASE WHEN $5 = 'author' THEN author_name ELSE title END, id \
             LIMIT $6 OFFSET $7"
        );
        let rows = sqlx::query_as::<_, BookModel>(&sql)
            .bind(library_id.into_inner())
            .bind(&pattern)
            .bind(category)
            .bind(status)
            .bind(sort_key(query.sort))
            .bind(query.page.limit())
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(map_all(rows)?, total, query.page))
    }

    #[instrument(skip(self))]
    async fn search_available(
        &self,
        library_id: LibraryId,
        term: &str,
        limit: i64,
    ) -> RepoResult<Vec<Book>> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE library_id = $1 AND status = 'active' AND available_copies > 0 \
               AND ($2::TEXT IS NULL OR title ILIKE $2 OR author_name ILIKE $2 \
                    OR isbn ILIKE $2 OR book_code ILIKE $2) \
             ORDER BY title, id \
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, BookModel>(&sql)
            .bind(library_id.into_inner())
            .bind(like_pattern(Some(term)))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        map_all(rows)
    }

    #[instrument(skip(self, book), fields(book_code = %book.book_code))]
    async fn create(&self, book: &NewBook) -> RepoResult<Book> {
        let sql = format!(
            "INSERT INTO books (library_id, book_code, title, author_name, isbn, category_id, \
                                total_copies, available_copies, status, cover_image) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8, $9) \
             RETURNING {BOOK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookModel>(&sql)
            .bind(book.library_id.into_inner())
            .bind(&book.book_code)
            .bind(&book.title)
            .bind(&book.author_name)
            .bind(&book.isbn)
            .bind(book.category_id.map(|c| c.into_inner()))
            .bind(book.total_copies)
            .bind(book.status.as_str())
            .bind(&book.cover_image)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, || DomainError::BookCodeExists(book.book_code.clone())))?;

        row.try_into()
    }

    #[instrument(skip(self, book), fields(book_id = %book.id))]
    async fn update(&self, book: &Book) -> RepoResult<Book> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut current = lock_book(&mut tx, book.library_id, book.id).await?;
        current.apply_edit(book)?;

        let sql = format!(
            "UPDATE books \
             SET book_code = $3, title = $4, author_name = $5, isbn = $6, category_id = $7, \
                 total_copies = $8, available_copies = $9, status = $10, cover_image = $11, \
                 updated_at = NOW() \
             WHERE id = $1 AND library_id = $2 \
             RETURNING {BOOK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookModel>(&sql)
            .bind(current.id.into_inner())
            .bind(current.library_id.into_inner())
            .bind(&current.book_code)
            .bind(&current.title)
            .bind(&current.author_name)
            .bind(&current.isbn)
            .bind(current.category_id.map(|c| c.into_inner()))
            .bind(current.total_copies)
            .bind(current.available_copies)
            .bind(current.status.as_str())
            .bind(&current.cover_image)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                map_unique_violation(e, || DomainError::BookCodeExists(current.book_code.clone()))
            })?;

        tx.commit().await.map_err(map_db_error)?;

        row.try_into()
    }

    #[instrument(skip(self))]
    async fn delete(&self, library_id: LibraryId, id: BookId) -> RepoResult<Book> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1 AND library_id = $2 FOR UPDATE"
        );
        let book: Book = sqlx::query_as::<_, BookModel>(&sql)
            .bind(id.into_inner())
            .bind(library_id.into_inner())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| book_not_found(id))?
            .try_into()?;

        let active = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM borrowings WHERE book_id = $1 AND status = 'active'
            ",
        )
        .bind(id.into_inner())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if active > 0 {
            return Err(DomainError::HasActiveBorrowings(active));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(book)
    }
}
