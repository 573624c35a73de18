//! # lms-core
//!
//! Domain layer for the library management service: entities, lifecycle
//! rules for borrowings, reservations and attendance, and the repository
//! and side-effect traits implemented by the infrastructure crates.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    format_clock_time, format_user_code, generate_account_token, generate_temporary_password,
    generate_transaction_id, ActivityLog, AttendanceRecord, AttendanceState, Book, BookStatus,
    BorrowOrigin, Borrowing, BorrowingStatus, Category, CheckInAction, ConversationSummary,
    Library, Member, Message, NewActivity, NewBook, NewBorrowing, NewCategory, NewMember,
    NewMessage, NewReservation, Reservation, ReservationStatus, UserStatus, MAX_MESSAGE_LENGTH,
    RESET_TOKEN_TTL_HOURS,
};
pub use error::DomainError;
pub use traits::{
    ActivityLogRepository, AttendanceRepository, BookQuery, BookRepository, BookSort,
    BorrowingFilter, BorrowingQuery, BorrowingRepository, CategoryRepository, Clock, CoverStore,
    LibraryRepository, Mailer, MemberQuery, MemberRepository, MessageRepository, Notification,
    NotificationKind, Notifier, OutgoingMail, RepoResult, ReservationQuery,
    ReservationRepository, SystemClock,
};
pub use value_objects::{
    ActivityId, AttendanceId, BookId, BorrowingId, CategoryId, CoverFormat, CoverUpload,
    IdParseError, LibraryId, MessageId, Page, PageRequest, RequestContext, ReservationId,
    UserId, UserRole,
};
