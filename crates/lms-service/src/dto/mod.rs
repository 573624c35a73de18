//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    ActivityQuery, ApproveReservationRequest, AttendanceDateQuery, BookListQuery, BookSortParam,
    BorrowRequest, BorrowingFilterParam, BorrowingListQuery, CompleteSetupRequest,
    ConfirmPasswordResetRequest, CreateBookRequest, CreateCategoryRequest, CreateMemberRequest,
    CreateReservationRequest, HistoryQuery, LoginRequest, MemberListQuery, PasswordResetRequest,
    RejectReservationRequest, RenewRequest, ReservationListQuery, SearchQuery,
    SendMessageRequest, UpdateBookRequest, UpdateMemberRequest, MAX_HISTORY_SPAN_DAYS,
};

pub use responses::{
    ActivityResponse, AttendanceResponse, AuthResponse, BookResponse, BorrowResponse,
    BorrowingResponse, CategoryResponse, ConversationResponse, DailyAttendanceEntry,
    DailyAttendanceResponse, DirectMessageResponse, ExpireResponse,
    HealthChecks, HealthResponse, MemberDetailResponse, MemberResponse, MessageResponse,
    PageResponse, PaginationMeta, ReadinessResponse, ReservationResponse, UnreadCountResponse,
};
