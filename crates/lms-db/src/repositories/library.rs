//! PostgreSQL implementation of LibraryRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use lms_core::entities::Library;
use lms_core::traits::{LibraryRepository, RepoResult};
use lms_core::value_objects::LibraryId;

use crate::models::LibraryModel;

use super::error::{library_not_found, map_db_error};

/// PostgreSQL implementation of LibraryRepository
#[derive(Clone)]
pub struct PgLibraryRepository {
    pool: PgPool,
}

impl PgLibraryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LibraryRepository for PgLibraryRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: LibraryId) -> RepoResult<Option<Library>> {
        let result = sqlx::query_as::<_, LibraryModel>(
            r"
            SELECT id, name, current_book_count, created_at
            FROM libraries
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Library::from))
    }

    #[instrument(skip(self))]
    async fn refresh_book_count(&self, id: LibraryId) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            UPDATE libraries
            SET current_book_count = (SELECT COUNT(*) FROM books WHERE library_id = $1)
            WHERE id = $1
            RETURNING current_book_count
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        count.ok_or_else(|| library_not_found(id))
    }
}
