//! # lms-service
//!
//! Application layer: library use cases on top of the lms-core ports,
//! request/response DTOs, and the filesystem cover store.
//!
//! Every service method takes the caller's [`lms_core::RequestContext`];
//! lookups are confined to `ctx.library_id` and staff-only operations check
//! the role before touching storage.

pub mod dto;
pub mod services;
pub mod storage;

pub use services::{
    ActivityService, AttendanceService, AuthService, BookService, BorrowingService,
    CategoryService, MemberService, MessageService, ReservationService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, ServiceSettings,
};
pub use storage::FsCoverStore;
