//! Database models - SQLx-compatible structs for PostgreSQL tables

mod activity;
mod attendance;
mod book;
mod borrowing;
mod category;
mod library;
mod message;
mod reservation;
mod user;

pub use activity::ActivityLogModel;
pub use attendance::AttendanceModel;
pub use book::BookModel;
pub use borrowing::BorrowingModel;
pub use category::CategoryModel;
pub use library::LibraryModel;
pub use message::{ConversationModel, MessageModel};
pub use reservation::ReservationModel;
pub use user::{UserModel, UserWithResetModel};
