//! Ports implemented by the infrastructure crates

mod clock;
mod effects;
mod repositories;

pub use clock::{Clock, SystemClock};
pub use effects::{CoverStore, Mailer, Notification, NotificationKind, Notifier, OutgoingMail};
pub use repositories::{
    ActivityLogRepository, AttendanceRepository, BookQuery, BookRepository, BookSort,
    BorrowingFilter, BorrowingQuery, BorrowingRepository, CategoryRepository, LibraryRepository,
    MemberQuery, MemberRepository, MessageRepository, RepoResult, ReservationQuery,
    ReservationRepository,
};
