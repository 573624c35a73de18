//! PostgreSQL implementation of BorrowingRepository
//!
//! Every write that moves a copy runs in one transaction with the book row
//! (and the backing reservation, if any) locked `FOR UPDATE`, so concurrent
//! loans of the last copy serialize and `available_copies` never goes
//! negative.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use lms_core::entities::{Book, BorrowOrigin, Borrowing, NewBorrowing, Reservation};
use lms_core::error::DomainError;
use lms_core::traits::{BorrowingFilter, BorrowingQuery, BorrowingRepository, RepoResult};
use lms_core::value_objects::{BookId, BorrowingId, LibraryId, Page};

use crate::mappers::map_all;
use crate::models::{BookModel, BorrowingModel, ReservationModel};

use super::error::{book_not_found, borrowing_not_found, map_db_error, map_unique_violation};

pub(crate) const BORROWING_COLUMNS: &str = "id, library_id, transaction_id, member_id, book_id, \
     reservation_id, issued_by, issue_date, due_date, return_date, renewal_count, status, notes, \
     created_at";

/// PostgreSQL implementation of BorrowingRepository
#[derive(Clone)]
pub struct PgBorrowingRepository {
    pool: PgPool,
}

impl PgBorrowingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Lock a book row for the rest of the transaction
pub(crate) async fn lock_book(
    tx: &mut Transaction<'_, Postgres>,
    library_id: LibraryId,
    id: BookId,
) -> RepoResult<Book> {
    sqlx::query_as::<_, BookModel>(
        r"
        SELECT id, library_id, book_code, title, author_name, isbn, category_id,
               total_copies, available_copies, status, cover_image, created_at, updated_at
        FROM books
        WHERE id = $1 AND library_id = $2
        FOR UPDATE
        ",
    )
    .bind(id.into_inner())
    .bind(library_id.into_inner())
    .fetch_optional(&mut **tx)
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| book_not_found(id))?
    .try_into()
}

/// Write back the copy counter of a locked book
pub(crate) async fn store_available_copies(
    tx: &mut Transaction<'_, Postgres>,
    book: &Book,
) -> RepoResult<()> {
    sqlx::query("UPDATE books SET available_copies = $2, updated_at = NOW() WHERE id = $1")
        .bind(book.id.into_inner())
        .bind(book.available_copies)
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;
    Ok(())
}

async fn lock_borrowing(
    tx: &mut Transaction<'_, Postgres>,
    library_id: LibraryId,
    id: BorrowingId,
) -> RepoResult<Borrowing> {
    let sql = format!(
        "SELECT {BORROWING_COLUMNS} FROM borrowings WHERE id = $1 AND library_id = $2 FOR UPDATE"
    );
    sqlx::query_as::<_, BorrowingModel>(&sql)
        .bind(id.into_inner())
        .bind(library_id.into_inner())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| borrowing_not_found(id))?
        .try_into()
}

/// Status and due-date bounds for a listing filter
fn filter_bounds(filter: BorrowingFilter, today: NaiveDate) -> (Option<&'static str>, Option<NaiveDate>) {
    match filter {
        BorrowingFilter::All => (None, None),
        BorrowingFilter::Active => (Some("active"), None),
        BorrowingFilter::Returned => (Some("returned"), None),
        BorrowingFilter::Overdue => (Some("active"), Some(today)),
    }
}

#[async_trait]
impl BorrowingRepository for PgBorrowingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        library_id: LibraryId,
        id: BorrowingId,
    ) -> RepoResult<Option<Borrowing>> {
        let sql =
            format!("SELECT {BORROWING_COLUMNS} FROM borrowings WHERE id = $1 AND library_id = $2");
        let result = sqlx::query_as::<_, BorrowingModel>(&sql)
            .bind(id.into_inner())
            .bind(library_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Borrowing::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        library_id: LibraryId,
        query: &BorrowingQuery,
        today: NaiveDate,
    ) -> RepoResult<Page<Borrowing>> {
        let (status, due_before) = filter_bounds(query.filter, today);
        let member = query.member_id.map(|m| m.into_inner());
        let book = query.book_id.map(|b| b.into_inner());

        let filter = r"
            WHERE library_id = $1
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::DATE IS NULL OR due_date < $3)
              AND ($4::BIGINT IS NULL OR member_id = $4)
              AND ($5::BIGINT IS NULL OR book_id = $5)
        ";

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM borrowings {filter}"))
                .bind(library_id.into_inner())
                .bind(status)
                .bind(due_before)
                .bind(member)
                .bind(book)
                .fetch_one(&self.pool)
                .await
                .map_err(map_db_error)?;

        let sql = format!(
            "SELECT {BORROWING_COLUMNS} FROM borrowings {filter} \
             ORDER BY issue_date DESC, id DESC LIMIT $6 OFFSET $7"
        );
        let rows = sqlx::query_as::<_, BorrowingModel>(&sql)
            .bind(library_id.into_inner())
            .bind(status)
            .bind(due_before)
            .bind(member)
            .bind(book)
            .bind(query.page.limit())
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(map_all(rows)?, total, query.page))
    }

    #[instrument(skip(self, borrowing), fields(member_id = %borrowing.member_id, book_id = %borrowing.book_id))]
    async fn borrow(
        &self,
        borrowing: &NewBorrowing,
        transaction_id: &str,
    ) -> RepoResult<(Borrowing, BorrowOrigin)> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut book = lock_book(&mut tx, borrowing.library_id, borrowing.book_id).await?;
        book.ensure_lendable()?;

        // An approved reservation wins over a consumed one
        let reservation: Option<Reservation> = sqlx::query_as::<_, ReservationModel>(
            r"
            SELECT id, library_id, member_id, book_id, reservation_date, expiry_date, status,
                   librarian_notes, rejection_reason, processed_by, processed_at, created_at
            FROM reservations
            WHERE member_id = $1 AND book_id = $2 AND status IN ('approved', 'borrowed')
            ORDER BY (status = 'approved') DESC, created_at
            LIMIT 1
            FOR UPDATE
            ",
        )
        .bind(borrowing.member_id.into_inner())
        .bind(borrowing.book_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(Reservation::try_from)
        .transpose()?;

        let origin = BorrowOrigin::decide(&book, reservation.as_ref())?;
        match (origin, reservation) {
            (BorrowOrigin::FromReservation(_), Some(mut reservation)) => {
                reservation.mark_borrowed()?;
                sqlx::query("UPDATE reservations SET status = $2 WHERE id = $1")
                    .bind(reservation.id.into_inner())
                    .bind(reservation.status.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(map_db_error)?;
            }
            _ => {
                book.take_copy()?;
                store_available_copies(&mut tx, &book).await?;
            }
        }

        let sql = format!(
            "INSERT INTO borrowings (library_id, transaction_id, member_id, book_id, \
                                     reservation_id, issued_by, issue_date, due_date, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {BORROWING_COLUMNS}"
        );
        let created: Borrowing = sqlx::query_as::<_, BorrowingModel>(&sql)
            .bind(borrowing.library_id.into_inner())
            .bind(transaction_id)
            .bind(borrowing.member_id.into_inner())
            .bind(borrowing.book_id.into_inner())
            .bind(origin.reservation_id().map(|r| r.into_inner()))
            .bind(borrowing.issued_by.into_inner())
            .bind(borrowing.issue_date)
            .bind(borrowing.due_date)
            .bind(&borrowing.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                map_unique_violation(e, || {
                    DomainError::InternalError("Transaction id collision".to_string())
                })
            })?
            .try_into()?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(transaction_id, ?origin, "Borrowing created");
        Ok((created, origin))
    }

    #[instrument(skip(self))]
    async fn renew(
        &self,
        library_id: LibraryId,
        id: BorrowingId,
        new_due_date: NaiveDate,
        today: NaiveDate,
    ) -> RepoResult<Borrowing> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut borrowing = lock_borrowing(&mut tx, library_id, id).await?;
        borrowing.renew(new_due_date, today)?;

        sqlx::query("UPDATE borrowings SET due_date = $2, renewal_count = $3 WHERE id = $1")
            .bind(id.into_inner())
            .bind(borrowing.due_date)
            .bind(borrowing.renewal_count)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(borrowing)
    }

    #[instrument(skip(self))]
    async fn mark_returned(
        &self,
        library_id: LibraryId,
        id: BorrowingId,
        today: NaiveDate,
    ) -> RepoResult<Borrowing> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut borrowing = lock_borrowing(&mut tx, library_id, id).await?;
        borrowing.mark_returned(today)?;

        sqlx::query("UPDATE borrowings SET status = $2, return_date = $3 WHERE id = $1")
            .bind(id.into_inner())
            .bind(borrowing.status.as_str())
            .bind(borrowing.return_date)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let mut book = lock_book(&mut tx, library_id, borrowing.book_id).await?;
        book.return_copy();
        store_available_copies(&mut tx, &book).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(borrowing)
    }
}
