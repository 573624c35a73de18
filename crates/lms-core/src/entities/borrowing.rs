//! Borrowing entity - one copy of a book lent to a member

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Book, Reservation, ReservationStatus};
use crate::error::DomainError;
use crate::value_objects::{BookId, BorrowingId, LibraryId, ReservationId, UserId};

/// Stored borrowing status. Overdue is derived from the due date, see
/// [`Borrowing::is_overdue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowingStatus {
    Active,
    Returned,
}

text_enum!(BorrowingStatus, "borrowing status", {
    Active => "active",
    Returned => "returned",
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Borrowing {
    pub id: BorrowingId,
    pub library_id: LibraryId,
    pub transaction_id: String,
    pub member_id: UserId,
    pub book_id: BookId,
    /// Set when the loan consumed an approved reservation
    pub reservation_id: Option<ReservationId>,
    pub issued_by: UserId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Always `None` while the borrowing is active
    pub return_date: Option<NaiveDate>,
    pub renewal_count: i32,
    pub status: BorrowingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Borrowing {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == BorrowingStatus::Active
    }

    /// Active and past its due date
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_active() && self.due_date < today
    }

    /// Whole days past the due date (0 when not overdue)
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        if self.is_overdue(today) {
            (today - self.due_date).num_days()
        } else {
            0
        }
    }

    /// Extend the due date. Only active loans that are not yet overdue can be
    /// renewed, and the new date must be later than the current one.
    pub fn renew(&mut self, new_due_date: NaiveDate, today: NaiveDate) -> Result<(), DomainError> {
        if !self.is_active() {
            return Err(DomainError::InvalidTransition {
                action: "renew borrowing",
                status: self.status.as_str(),
            });
        }
        if self.due_date < today {
            return Err(DomainError::CannotRenewOverdue);
        }
        if new_due_date <= self.due_date {
            return Err(DomainError::ValidationError(
                "New due date must be after the current due date".to_string(),
            ));
        }
        self.due_date = new_due_date;
        self.renewal_count += 1;
        Ok(())
    }

    /// active -> returned. The caller puts the copy back on the book in the
    /// same transaction.
    pub fn mark_returned(&mut self, today: NaiveDate) -> Result<(), DomainError> {
        if !self.is_active() {
            return Err(DomainError::InvalidTransition {
                action: "return borrowing",
                status: self.status.as_str(),
            });
        }
        self.status = BorrowingStatus::Returned;
        self.return_date = Some(today);
        Ok(())
    }
}

/// How a new borrowing obtains its copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowOrigin {
    /// Taken straight off the shelf; `available_copies` is decremented
    Direct,
    /// Handed over from an approved reservation, whose copy was already
    /// taken at approval time
    FromReservation(ReservationId),
}

impl BorrowOrigin {
    /// Decide the origin from the locked book row and the member's locked
    /// reservation for it, if any.
    ///
    /// Only an `approved` reservation backs a loan. A `borrowed` one has
    /// already been consumed, so the request falls back to the direct path.
    pub fn decide(book: &Book, reservation: Option<&Reservation>) -> Result<Self, DomainError> {
        if let Some(r) = reservation {
            if r.book_id == book.id && r.status == ReservationStatus::Approved {
                return Ok(Self::FromReservation(r.id));
            }
        }
        if book.available_copies > 0 {
            Ok(Self::Direct)
        } else {
            Err(DomainError::NoAvailableCopies)
        }
    }

    #[inline]
    pub fn is_from_reservation(self) -> bool {
        matches!(self, Self::FromReservation(_))
    }

    pub fn reservation_id(self) -> Option<ReservationId> {
        match self {
            Self::Direct => None,
            Self::FromReservation(id) => Some(id),
        }
    }
}

/// Data for a borrow request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBorrowing {
    pub library_id: LibraryId,
    pub member_id: UserId,
    pub book_id: BookId,
    pub issued_by: UserId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
}

impl NewBorrowing {
    pub fn validate_dates(&self) -> Result<(), DomainError> {
        if self.due_date <= self.issue_date {
            return Err(DomainError::ValidationError(
                "Due date must be after the issue date".to_string(),
            ));
        }
        Ok(())
    }
}

/// `TXN<unixtime><rand4>`, e.g. `TXN17093020004821`
pub fn generate_transaction_id(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("TXN{}{}", now.timestamp(), suffix)
}
