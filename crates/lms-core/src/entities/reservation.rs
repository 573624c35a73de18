//! Reservation entity and its state machine
//!
//! ```text
//! pending --approve--> approved --fulfill--> fulfilled
//!    |                    |------borrow---> borrowed
//!    |--reject--> rejected |
//!    |--cancel/expire------+--> cancelled / expired
//! ```
//!
//! An approved reservation holds one copy of the book. The copy is taken at
//! approval and either handed over by the borrowing that consumes the
//! reservation or put back when the reservation is cancelled or expires.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{BookId, LibraryId, ReservationId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Fulfilled,
    Expired,
    Borrowed,
}

text_enum!(ReservationStatus, "reservation status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Cancelled => "cancelled",
    Fulfilled => "fulfilled",
    Expired => "expired",
    Borrowed => "borrowed",
});

impl ReservationStatus {
    /// No further transitions are possible
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::Approved)
    }

    /// The reservation is keeping a copy off the shelf
    #[inline]
    pub fn holds_copy(self) -> bool {
        self == Self::Approved
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    pub library_id: LibraryId,
    pub member_id: UserId,
    pub book_id: BookId,
    pub reservation_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: ReservationStatus,
    pub librarian_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub processed_by: Option<UserId>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    fn require(
        &self,
        expected: ReservationStatus,
        action: &'static str,
    ) -> Result<(), DomainError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                action,
                status: self.status.as_str(),
            })
        }
    }

    /// pending -> approved. The caller takes one copy off the book in the
    /// same transaction.
    pub fn approve(
        &mut self,
        librarian_id: UserId,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.require(ReservationStatus::Pending, "approve reservation")?;
        self.status = ReservationStatus::Approved;
        self.librarian_notes = notes.filter(|n| !n.trim().is_empty());
        self.processed_by = Some(librarian_id);
        self.processed_at = Some(at);
        Ok(())
    }

    /// pending -> rejected. A reason is mandatory.
    pub fn reject(
        &mut self,
        librarian_id: UserId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.require(ReservationStatus::Pending, "reject reservation")?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::ValidationError(
                "A rejection reason is required".to_string(),
            ));
        }
        self.status = ReservationStatus::Rejected;
        self.rejection_reason = Some(reason.to_string());
        self.processed_by = Some(librarian_id);
        self.processed_at = Some(at);
        Ok(())
    }

    /// approved -> fulfilled
    pub fn fulfill(&mut self) -> Result<(), DomainError> {
        self.require(ReservationStatus::Approved, "fulfill reservation")?;
        self.status = ReservationStatus::Fulfilled;
        Ok(())
    }

    /// approved -> borrowed, when a borrowing consumes the held copy
    pub fn mark_borrowed(&mut self) -> Result<(), DomainError> {
        self.require(ReservationStatus::Approved, "borrow against reservation")?;
        self.status = ReservationStatus::Borrowed;
        Ok(())
    }

    /// Any non-terminal state -> cancelled.
    /// Returns `true` when a held copy must go back on the shelf.
    pub fn cancel(&mut self) -> Result<bool, DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidTransition {
                action: "cancel reservation",
                status: self.status.as_str(),
            });
        }
        let released = self.status.holds_copy();
        self.status = ReservationStatus::Cancelled;
        Ok(released)
    }

    /// The expiry date has passed while the reservation is still open
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.expiry_date < today
    }

    /// Open and past its expiry date -> expired.
    /// Returns `true` when a held copy must go back on the shelf.
    pub fn expire(&mut self, today: NaiveDate) -> Result<bool, DomainError> {
        if !self.is_stale(today) {
            return Err(DomainError::InvalidTransition {
                action: "expire reservation",
                status: self.status.as_str(),
            });
        }
        let released = self.status.holds_copy();
        self.status = ReservationStatus::Expired;
        Ok(released)
    }
}

/// Data for inserting a pending reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub library_id: LibraryId,
    pub member_id: UserId,
    pub book_id: BookId,
    pub reservation_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub librarian_notes: Option<String>,
}

impl NewReservation {
    /// A reservation made `today` stays open for `window_days`
    pub fn new(
        library_id: LibraryId,
        member_id: UserId,
        book_id: BookId,
        today: NaiveDate,
        window_days: u32,
    ) -> Self {
        Self {
            library_id,
            member_id,
            book_id,
            reservation_date: today,
            expiry_date: today + Duration::days(i64::from(window_days)),
            librarian_notes: None,
        }
    }
}
