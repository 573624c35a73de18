//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{BookId, BorrowingId, CategoryId, LibraryId, ReservationId, UserId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Library not found: {0}")]
    LibraryNotFound(LibraryId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Book not found")]
    BookNotFound(Option<BookId>),

    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    #[error("Borrowing not found: {0}")]
    BorrowingNotFound(BorrowingId),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    #[error("No attendance record for this day")]
    AttendanceNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("No available copies")]
    NoAvailableCopies,

    #[error("Cannot renew overdue books")]
    CannotRenewOverdue,

    #[error("Cannot {action}: status is {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },

    #[error("Member is already checked in")]
    AlreadyCheckedIn,

    #[error("Member must check in before checking out")]
    NotCheckedIn,

    #[error("Member has already checked out")]
    AlreadyCheckedOut,

    #[error("Invalid or unknown token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid cover image: {0}")]
    InvalidCover(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Pending accounts cannot be deleted")]
    CannotDeletePending,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is not active")]
    AccountNotActive,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Username already in use")]
    UsernameAlreadyExists,

    #[error("Book ID already exists: {0}")]
    BookCodeExists(String),

    #[error("Category already exists: {0}")]
    CategoryExists(String),

    #[error("An open reservation already exists for this book")]
    DuplicateReservation,

    #[error("Cannot delete: {0} active borrowing(s)")]
    HasActiveBorrowings(i64),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::LibraryNotFound(_) => "UNKNOWN_LIBRARY",
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::BookNotFound(_) => "UNKNOWN_BOOK",
            Self::CategoryNotFound(_) => "UNKNOWN_CATEGORY",
            Self::BorrowingNotFound(_) => "UNKNOWN_BORROWING",
            Self::ReservationNotFound(_) => "UNKNOWN_RESERVATION",
            Self::AttendanceNotFound => "UNKNOWN_ATTENDANCE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::NoAvailableCopies => "NO_AVAILABLE_COPIES",
            Self::CannotRenewOverdue => "CANNOT_RENEW_OVERDUE",
            Self::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::AlreadyCheckedIn => "ALREADY_CHECKED_IN",
            Self::NotCheckedIn => "NOT_CHECKED_IN",
            Self::AlreadyCheckedOut => "ALREADY_CHECKED_OUT",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidCover(_) => "INVALID_COVER",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::CannotDeletePending => "CANNOT_DELETE_PENDING",

            // Authorization
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountNotActive => "ACCOUNT_NOT_ACTIVE",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::BookCodeExists(_) => "BOOK_ID_EXISTS",
            Self::CategoryExists(_) => "CATEGORY_EXISTS",
            Self::DuplicateReservation => "DUPLICATE_RESERVATION",
            Self::HasActiveBorrowings(_) => "HAS_ACTIVE_BORROWINGS",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::LibraryNotFound(_)
                | Self::UserNotFound(_)
                | Self::BookNotFound(_)
                | Self::CategoryNotFound(_)
                | Self::BorrowingNotFound(_)
                | Self::ReservationNotFound(_)
                | Self::AttendanceNotFound
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::NoAvailableCopies
                | Self::CannotRenewOverdue
                | Self::InvalidTransition { .. }
                | Self::AlreadyCheckedIn
                | Self::NotCheckedIn
                | Self::AlreadyCheckedOut
                | Self::InvalidToken
                | Self::TokenExpired
                | Self::InvalidCover(_)
                | Self::ContentTooLong { .. }
                | Self::CannotDeletePending
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::Forbidden(_) | Self::InvalidCredentials | Self::AccountNotActive
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists
                | Self::UsernameAlreadyExists
                | Self::BookCodeExists(_)
                | Self::CategoryExists(_)
                | Self::DuplicateReservation
                | Self::HasActiveBorrowings(_)
        )
    }
}
