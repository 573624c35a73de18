//! Value objects - immutable types defined by their values

mod context;
mod cover;
mod ids;
mod pagination;

pub use context::{RequestContext, UserRole};
pub use cover::{CoverFormat, CoverUpload};
pub use ids::{
    ActivityId, AttendanceId, BookId, BorrowingId, CategoryId, IdParseError, LibraryId, MessageId,
    ReservationId, UserId,
};
pub use pagination::{Page, PageRequest};
