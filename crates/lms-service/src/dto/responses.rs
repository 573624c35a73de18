//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, NaiveDate, Utc};
use lms_core::{
    ActivityId, AttendanceId, BookId, BookStatus, BorrowingId, BorrowingStatus, CategoryId,
    LibraryId, MessageId, Page, ReservationId, ReservationStatus, UserId, UserRole, UserStatus,
};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// One page of a listing with offset pagination metadata
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    /// Convert each item of a domain page
    pub fn from_page<U>(page: Page<U>, f: impl FnMut(U) -> T) -> Self {
        let pagination = PaginationMeta {
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            total_pages: page.total_pages(),
        };
        Self {
            data: page.items.into_iter().map(f).collect(),
            pagination,
        }
    }
}

/// Plain acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Auth Responses
// ============================================================================

/// Login response (bearer token plus the signed-in account)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: MemberResponse,
}

// ============================================================================
// Catalog Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BookResponse {
    pub id: BookId,
    pub book_code: String,
    pub title: String,
    pub author_name: String,
    pub isbn: String,
    pub category_id: Option<CategoryId>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub status: BookStatus,
    pub is_available: bool,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Member Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub id: UserId,
    pub library_id: LibraryId,
    pub user_code: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Member lookup for the circulation desk
#[derive(Debug, Clone, Serialize)]
pub struct MemberDetailResponse {
    #[serde(flatten)]
    pub member: MemberResponse,
    pub active_borrowings: i64,
}

// ============================================================================
// Circulation Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BorrowingResponse {
    pub id: BorrowingId,
    pub transaction_id: String,
    pub member_id: UserId,
    pub book_id: BookId,
    pub reservation_id: Option<ReservationId>,
    pub issued_by: UserId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub renewal_count: i32,
    pub status: BorrowingStatus,
    pub is_overdue: bool,
    pub days_overdue: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of lending a copy
#[derive(Debug, Clone, Serialize)]
pub struct BorrowResponse {
    #[serde(flatten)]
    pub borrowing: BorrowingResponse,
    /// The loan consumed an approved reservation instead of a shelf copy
    pub from_reservation: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservationResponse {
    pub id: ReservationId,
    pub member_id: UserId,
    pub book_id: BookId,
    pub reservation_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: ReservationStatus,
    pub librarian_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub processed_by: Option<UserId>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ExpireResponse {
    pub expired: usize,
    pub reservations: Vec<ReservationResponse>,
}

// ============================================================================
// Attendance Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceResponse {
    pub id: AttendanceId,
    pub user_id: UserId,
    pub attendance_date: NaiveDate,
    /// `absent`, `present`, `checked_in`, `checked_out` or `departure_only`
    pub state: &'static str,
    pub is_present: bool,
    /// Local time, e.g. `09:00 AM`
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
}

/// One member's line on the daily attendance sheet
#[derive(Debug, Clone, Serialize)]
pub struct DailyAttendanceEntry {
    pub member_id: UserId,
    pub user_code: String,
    pub full_name: String,
    pub state: &'static str,
    pub is_present: bool,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DailyAttendanceResponse {
    pub date: NaiveDate,
    pub present: usize,
    pub members: Vec<DailyAttendanceEntry>,
}

// ============================================================================
// Message Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DirectMessageResponse {
    pub id: MessageId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub user_id: UserId,
    pub full_name: String,
    pub last_message: String,
    pub last_message_at: DateTime<Utc>,
    pub last_sender_id: UserId,
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

// ============================================================================
// Activity Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ActivityResponse {
    pub id: ActivityId,
    pub user_id: UserId,
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Health Check Responses
// ============================================================================

/// Liveness check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each backing service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, redis_healthy: bool) -> Self {
        let all_healthy = database_healthy && redis_healthy;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
                redis: if redis_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::PageRequest;

    #[test]
    fn test_page_response_metadata() {
        let page = Page::new(vec![1, 2, 3], 23, PageRequest::new(2, 3));
        let response = PageResponse::from_page(page, |n| n * 2);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"], serde_json::json!([2, 4, 6]));
        assert_eq!(json["pagination"]["total"], 23);
        assert_eq!(json["pagination"]["total_pages"], 8);
        assert_eq!(json["pagination"]["page"], 2);
    }

    #[test]
    fn test_readiness() {
        let ready = ReadinessResponse::ready(true, true);
        assert!(ready.is_ready());
        let degraded = ReadinessResponse::ready(true, false);
        assert!(!degraded.is_ready());
        assert_eq!(degraded.checks.redis, "unhealthy");
    }

    #[test]
    fn test_status_enums_serialize_lowercase() {
        let json = serde_json::to_value(UnreadCountResponse { unread: 3 }).unwrap();
        assert_eq!(json["unread"], 3);
        assert_eq!(
            serde_json::to_value(ReservationStatus::Borrowed).unwrap(),
            "borrowed"
        );
    }
}
