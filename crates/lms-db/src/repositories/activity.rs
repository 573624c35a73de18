//! PostgreSQL implementation of ActivityLogRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use lms_core::entities::{ActivityLog, NewActivity};
use lms_core::traits::{ActivityLogRepository, RepoResult};
use lms_core::value_objects::LibraryId;

use crate::models::ActivityLogModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ActivityLogRepository
#[derive(Clone)]
pub struct PgActivityLogRepository {
    pool: PgPool,
}

impl PgActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogRepository for PgActivityLogRepository {
    #[instrument(skip(self, activity), fields(action = %activity.action))]
    async fn record(&self, activity: &NewActivity) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO activity_logs (library_id, user_id, action, description)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(activity.library_id.into_inner())
        .bind(activity.user_id.into_inner())
        .bind(&activity.action)
        .bind(&activity.description)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent(&self, library_id: LibraryId, limit: i64) -> RepoResult<Vec<ActivityLog>> {
        let rows = sqlx::query_as::<_, ActivityLogModel>(
            r"
            SELECT id, library_id, user_id, action, description, created_at
            FROM activity_logs
            WHERE library_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(library_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(ActivityLog::from).collect())
    }
}
