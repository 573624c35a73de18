//! PostgreSQL implementation of ReservationRepository
//!
//! Approval takes a copy off the locked book row; cancellation and expiry of
//! an approved reservation put it back.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};

use lms_core::entities::{NewReservation, Reservation};
use lms_core::error::DomainError;
use lms_core::traits::{RepoResult, ReservationQuery, ReservationRepository};
use lms_core::value_objects::{BookId, LibraryId, Page, ReservationId, UserId};

use crate::mappers::map_all;
use crate::models::ReservationModel;

use super::borrowing::{lock_book, store_available_copies};
use super::error::{map_db_error, map_unique_violation, reservation_not_found};

const RESERVATION_COLUMNS: &str = "id, library_id, member_id, book_id, reservation_date, \
     expiry_date, status, librarian_notes, rejection_reason, processed_by, processed_at, \
     created_at";

/// PostgreSQL implementation of ReservationRepository
#[derive(Clone)]
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run `apply` against the locked reservation, give back or take a copy
    /// as it reports, and persist the new state
    async fn transition<F>(
        &self,
        library_id: LibraryId,
        id: ReservationId,
        apply: F,
    ) -> RepoResult<Reservation>
    where
        F: FnOnce(&mut Reservation) -> Result<CopyMove, DomainError> + Send,
    {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Book before reservation, the same order a borrow takes its locks
        let book_id = sqlx::query_scalar::<_, i64>(
            "SELECT book_id FROM reservations WHERE id = $1 AND library_id = $2",
        )
        .bind(id.into_inner())
        .bind(library_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| reservation_not_found(id))?;

        let mut book = lock_book(&mut tx, library_id, BookId::new(book_id)).await?;
        let mut reservation = lock_reservation(&mut tx, library_id, id).await?;

        match apply(&mut reservation)? {
            CopyMove::Take => {
                book.ensure_lendable()?;
                book.take_copy()?;
                store_available_copies(&mut tx, &book).await?;
            }
            CopyMove::Release => {
                book.return_copy();
                store_available_copies(&mut tx, &book).await?;
            }
            CopyMove::None => {}
        }

        store_reservation(&mut tx, &reservation).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(reservation)
    }
}

/// Effect of a transition on the book's shelf count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyMove {
    None,
    Take,
    Release,
}

impl CopyMove {
    fn released(released: bool) -> Self {
        if released {
            Self::Release
        } else {
            Self::None
        }
    }
}

async fn lock_reservation(
    tx: &mut Transaction<'_, Postgres>,
    library_id: LibraryId,
    id: ReservationId,
) -> RepoResult<Reservation> {
    let sql = format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations \
         WHERE id = $1 AND library_id = $2 FOR UPDATE"
    );
    sqlx::query_as::<_, ReservationModel>(&sql)
        .bind(id.into_inner())
        .bind(library_id.into_inner())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| reservation_not_found(id))?
        .try_into()
}

async fn store_reservation(
    tx: &mut Transaction<'_, Postgres>,
    reservation: &Reservation,
) -> RepoResult<()> {
    sqlx::query(
        r"
        UPDATE reservations
        SET status = $2, librarian_notes = $3, rejection_reason = $4, processed_by = $5,
            processed_at = $6
        WHERE id = $1
        ",
    )
    .bind(reservation.id.into_inner())
    .bind(reservation.status.as_str())
    .bind(&reservation.librarian_notes)
    .bind(&reservation.rejection_reason)
    .bind(reservation.processed_by.map(|u| u.into_inner()))
    .bind(reservation.processed_at)
    .execute(&mut **tx)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        library_id: LibraryId,
        id: ReservationId,
    ) -> RepoResult<Option<Reservation>> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1 AND library_id = $2"
        );
        let result = sqlx::query_as::<_, ReservationModel>(&sql)
            .bind(id.into_inner())
            .bind(library_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Reservation::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        library_id: LibraryId,
        query: &ReservationQuery,
    ) -> RepoResult<Page<Reservation>> {
        let status = query.status.map(|s| s.as_str());
        let member = query.member_id.map(|m| m.into_inner());

        let filter = r"
            WHERE library_id = $1
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::BIGINT IS NULL OR member_id = $3)
        ";

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM reservations {filter}"))
                .bind(library_id.into_inner())
                .bind(status)
                .bind(member)
                .fetch_one(&self.pool)
                .await
                .map_err(map_db_error)?;

        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations {filter} \
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, ReservationModel>(&sql)
            .bind(library_id.into_inner())
            .bind(status)
            .bind(member)
            .bind(query.page.limit())
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(map_all(rows)?, total, query.page))
    }

    #[instrument(skip(self))]
    async fn has_open(&self, member_id: UserId, book_id: BookId) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM reservations
                WHERE member_id = $1 AND book_id = $2 AND status IN ('pending', 'approved')
            )
            ",
        )
        .bind(member_id.into_inner())
        .bind(book_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, reservation), fields(member_id = %reservation.member_id, book_id = %reservation.book_id))]
    async fn create(&self, reservation: &NewReservation) -> RepoResult<Reservation> {
        let sql = format!(
            "INSERT INTO reservations (library_id, member_id, book_id, reservation_date, \
                                       expiry_date, librarian_notes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {RESERVATION_COLUMNS}"
        );
        sqlx::query_as::<_, ReservationModel>(&sql)
            .bind(reservation.library_id.into_inner())
            .bind(reservation.member_id.into_inner())
            .bind(reservation.book_id.into_inner())
            .bind(reservation.reservation_date)
            .bind(reservation.expiry_date)
            .bind(&reservation.librarian_notes)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, || DomainError::DuplicateReservation))?
            .try_into()
    }

    #[instrument(skip(self, notes))]
    async fn approve(
        &self,
        library_id: LibraryId,
        id: ReservationId,
        librarian_id: UserId,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> RepoResult<Reservation> {
        self.transition(library_id, id, move |r| {
            r.approve(librarian_id, notes, at)?;
            Ok(CopyMove::Take)
        })
        .await
    }

    #[instrument(skip(self, reason))]
    async fn reject(
        &self,
        library_id: LibraryId,
        id: ReservationId,
        librarian_id: UserId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> RepoResult<Reservation> {
        let reason = reason.to_string();
        self.transition(library_id, id, move |r| {
            r.reject(librarian_id, &reason, at)?;
            Ok(CopyMove::None)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn fulfill(&self, library_id: LibraryId, id: ReservationId) -> RepoResult<Reservation> {
        self.transition(library_id, id, |r| {
            r.fulfill()?;
            Ok(CopyMove::None)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn cancel(&self, library_id: LibraryId, id: ReservationId) -> RepoResult<Reservation> {
        self.transition(library_id, id, |r| Ok(CopyMove::released(r.cancel()?)))
            .await
    }

    #[instrument(skip(self))]
    async fn expire_stale(
        &self,
        library_id: LibraryId,
        today: NaiveDate,
    ) -> RepoResult<Vec<Reservation>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            SELECT id FROM books
            WHERE id IN (
                SELECT book_id FROM reservations
                WHERE library_id = $1 AND status = 'approved' AND expiry_date < $2
            )
            ORDER BY id
            FOR UPDATE
            ",
        )
        .bind(library_id.into_inner())
        .bind(today)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE library_id = $1 AND status IN ('pending', 'approved') AND expiry_date < $2 \
             ORDER BY id \
             FOR UPDATE"
        );
        let stale: Vec<Reservation> = map_all(
            sqlx::query_as::<_, ReservationModel>(&sql)
                .bind(library_id.into_inner())
                .bind(today)
                .fetch_all(&mut *tx)
                .await
                .map_err(map_db_error)?,
        )?;

        let mut expired = Vec::with_capacity(stale.len());
        for mut reservation in stale {
            if reservation.expire(today)? {
                let mut book = lock_book(&mut tx, library_id, reservation.book_id).await?;
                book.return_copy();
                store_available_copies(&mut tx, &book).await?;
            }
            store_reservation(&mut tx, &reservation).await?;
            expired.push(reservation);
        }

        tx.commit().await.map_err(map_db_error)?;

        if !expired.is_empty() {
            info!(library_id = %library_id, count = expired.len(), "Expired stale reservations");
        }
        Ok(expired)
    }
}
