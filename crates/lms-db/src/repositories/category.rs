//! PostgreSQL implementation of CategoryRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use lms_core::entities::{Category, NewCategory};
use lms_core::error::DomainError;
use lms_core::traits::{CategoryRepository, RepoResult};
use lms_core::value_objects::{CategoryId, LibraryId};

use crate::models::CategoryModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of CategoryRepository
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        library_id: LibraryId,
        id: CategoryId,
    ) -> RepoResult<Option<Category>> {
        let result = sqlx::query_as::<_, CategoryModel>(
            r"
            SELECT id, library_id, name, description, created_at
            FROM categories
            WHERE id = $1 AND library_id = $2
            ",
        )
        .bind(id.into_inner())
        .bind(library_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Category::from))
    }

    #[instrument(skip(self))]
    async fn list(&self, library_id: LibraryId) -> RepoResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryModel>(
            r"
            SELECT id, library_id, name, description, created_at
            FROM categories
            WHERE library_id = $1
            ORDER BY name
            ",
        )
        .bind(library_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    #[instrument(skip(self, category), fields(name = %category.name))]
    async fn create(&self, category: &NewCategory) -> RepoResult<Category> {
        let row = sqlx::query_as::<_, CategoryModel>(
            r"
            INSERT INTO categories (library_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, library_id, name, description, created_at
            ",
        )
        .bind(category.library_id.into_inner())
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::CategoryExists(category.name.clone())))?;

        Ok(row.into())
    }
}
