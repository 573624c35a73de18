//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in lms-core.
//! Each repository handles database operations for a specific domain entity.

mod activity;
mod attendance;
mod book;
mod borrowing;
mod category;
mod error;
mod library;
mod member;
mod message;
mod reservation;
mod search;

pub use activity::PgActivityLogRepository;
pub use attendance::PgAttendanceRepository;
pub use book::PgBookRepository;
pub use borrowing::PgBorrowingRepository;
pub use category::PgCategoryRepository;
pub use library::PgLibraryRepository;
pub use member::PgMemberRepository;
pub use message::PgMessageRepository;
pub use reservation::PgReservationRepository;
pub use search::like_pattern;
