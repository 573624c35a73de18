//! PostgreSQL implementation of AttendanceRepository

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use tracing::instrument;

use lms_core::entities::AttendanceRecord;
use lms_core::error::DomainError;
use lms_core::traits::{AttendanceRepository, RepoResult};
use lms_core::value_objects::{AttendanceId, LibraryId, UserId};

use crate::models::AttendanceModel;

use super::error::{map_db_error, map_unique_violation};

const ATTENDANCE_COLUMNS: &str =
    "id, library_id, user_id, attendance_date, arrival_time, departure_time";

/// PostgreSQL implementation of AttendanceRepository
#[derive(Clone)]
pub struct PgAttendanceRepository {
    pool: PgPool,
}

impl PgAttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn set_time(
        &self,
        id: AttendanceId,
        column: &'static str,
        time: NaiveTime,
    ) -> RepoResult<AttendanceRecord> {
        let sql = format!(
            "UPDATE attendance SET {column} = $2 WHERE id = $1 RETURNING {ATTENDANCE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AttendanceModel>(&sql)
            .bind(id.into_inner())
            .bind(time)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .ok_or(DomainError::AttendanceNotFound)?;

        Ok(row.into())
    }
}

#[async_trait]
impl AttendanceRepository for PgAttendanceRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
             WHERE library_id = $1 AND user_id = $2 AND attendance_date = $3"
        );
        let result = sqlx::query_as::<_, AttendanceModel>(&sql)
            .bind(library_id.into_inner())
            .bind(user_id.into_inner())
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(AttendanceRecord::from))
    }

    #[instrument(skip(self))]
    async fn insert_arrival(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> RepoResult<AttendanceRecord> {
        let sql = format!(
            "INSERT INTO attendance (library_id, user_id, attendance_date, arrival_time) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ATTENDANCE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AttendanceModel>(&sql)
            .bind(library_id.into_inner())
            .bind(user_id.into_inner())
            .bind(date)
            .bind(time)
            .fetch_one(&self.pool)
            .await
            // A concurrent check-in already created the day's row
            .map_err(|e| map_unique_violation(e, || DomainError::AlreadyCheckedIn))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn set_arrival(
        &self,
        id: AttendanceId,
        time: NaiveTime,
    ) -> RepoResult<AttendanceRecord> {
        self.set_time(id, "arrival_time", time).await
    }

    #[instrument(skip(self))]
    async fn set_departure(
        &self,
        id: AttendanceId,
        time: NaiveTime,
    ) -> RepoResult<AttendanceRecord> {
        self.set_time(id, "departure_time", time).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: AttendanceId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AttendanceNotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_for_date(
        &self,
        library_id: LibraryId,
        date: NaiveDate,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
             WHERE library_id = $1 AND attendance_date = $2 \
             ORDER BY arrival_time NULLS LAST, id"
        );
        let rows = sqlx::query_as::<_, AttendanceModel>(&sql)
            .bind(library_id.into_inner())
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn history(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
             WHERE library_id = $1 AND user_id = $2 AND attendance_date BETWEEN $3 AND $4 \
             ORDER BY attendance_date"
        );
        let rows = sqlx::query_as::<_, AttendanceModel>(&sql)
            .bind(library_id.into_inner())
            .bind(user_id.into_inner())
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }
}
