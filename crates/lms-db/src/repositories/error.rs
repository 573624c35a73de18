//! Error handling utilities for repositories

use lms_core::error::DomainError;
use lms_core::value_objects::{BookId, BorrowingId, LibraryId, ReservationId, UserId};
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

pub fn library_not_found(id: LibraryId) -> DomainError {
    DomainError::LibraryNotFound(id)
}

pub fn user_not_found(id: UserId) -> DomainError {
    DomainError::UserNotFound(id)
}

pub fn book_not_found(id: BookId) -> DomainError {
    DomainError::BookNotFound(Some(id))
}

pub fn borrowing_not_found(id: BorrowingId) -> DomainError {
    DomainError::BorrowingNotFound(id)
}

pub fn reservation_not_found(id: ReservationId) -> DomainError {
    DomainError::ReservationNotFound(id)
}
