//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod activity;
pub mod attendance;
pub mod auth;
pub mod book;
pub mod borrowing;
pub mod category;
pub mod context;
pub mod error;
mod mail;
pub mod member;
pub mod message;
pub mod reservation;

// Re-export all services for convenience
pub use activity::ActivityService;
pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use book::BookService;
pub use borrowing::BorrowingService;
pub use category::CategoryService;
pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use error::{ServiceError, ServiceResult};
pub use member::MemberService;
pub use message::MessageService;
pub use reservation::ReservationService;
