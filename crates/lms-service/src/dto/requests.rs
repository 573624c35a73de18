//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Query-string DTOs carry `page`/`per_page` directly because flattened
//! structs lose numeric parsing in `serde_urlencoded`.

use chrono::NaiveDate;
use lms_core::{
    BookId, BookSort, BookStatus, BorrowingFilter, CategoryId, PageRequest, ReservationStatus,
    UserId, UserRole, UserStatus,
};
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Longest attendance history range, in days
pub const MAX_HISTORY_SPAN_DAYS: i64 = 366;

fn page_request(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    PageRequest::new(
        page.unwrap_or(1),
        per_page.unwrap_or(PageRequest::DEFAULT_PER_PAGE),
    )
}

// ============================================================================
// Auth Requests
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// First password for an account created by a librarian
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CompleteSetupRequest {
    #[validate(length(equal = 64, message = "Invalid setup token"))]
    pub token: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfirmPasswordResetRequest {
    #[validate(length(equal = 64, message = "Invalid reset token"))]
    pub token: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,
}

// ============================================================================
// Catalog Requests
// ============================================================================

/// Create book request. `cover_image` is a base64 encoded JPEG, PNG or GIF.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, max = 50, message = "Book ID must be 1-50 characters"))]
    pub book_code: String,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 255, message = "Author name must be 1-255 characters"))]
    pub author_name: String,

    #[validate(length(min = 1, max = 20, message = "ISBN must be 1-20 characters"))]
    pub isbn: String,

    pub category_id: Option<CategoryId>,

    #[validate(range(min = 1, message = "Total copies must be at least 1"))]
    pub total_copies: i32,

    pub status: Option<BookStatus>,

    pub cover_image: Option<String>,
}

/// Partial book update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, max = 50, message = "Book ID must be 1-50 characters"))]
    pub book_code: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Author name must be 1-255 characters"))]
    pub author_name: Option<String>,

    #[validate(length(min = 1, max = 20, message = "ISBN must be 1-20 characters"))]
    pub isbn: Option<String>,

    pub category_id: Option<CategoryId>,

    #[validate(range(min = 1, message = "Total copies must be at least 1"))]
    pub total_copies: Option<i32>,

    pub status: Option<BookStatus>,

    /// New cover, base64 encoded
    pub cover_image: Option<String>,

    /// Drop the current cover without replacing it
    #[serde(default)]
    pub remove_cover: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Catalog sort order as accepted on the query string
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSortParam {
    #[default]
    Title,
    Author,
}

impl From<BookSortParam> for BookSort {
    fn from(param: BookSortParam) -> Self {
        match param {
            BookSortParam::Title => Self::Title,
            BookSortParam::Author => Self::Author,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookListQuery {
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub status: Option<BookStatus>,
    #[serde(default)]
    pub sort: BookSortParam,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl BookListQuery {
    pub fn page(&self) -> PageRequest {
        page_request(self.page, self.per_page)
    }
}

/// Term for the JSON search actions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default, alias = "term")]
    pub q: String,
    pub limit: Option<i64>,
}

impl SearchQuery {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 50;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

// ============================================================================
// Member Requests
// ============================================================================

fn username_chars(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Ok(())
    } else {
        Err(ValidationError::new("username")
            .with_message("Username may only contain letters, digits, '.', '_' and '-'".into()))
    }
}

/// Create account request. The account starts pending until the setup link is used.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMemberRequest {
    #[validate(
        length(min = 3, max = 50, message = "Username must be 3-50 characters"),
        custom(function = "username_chars")
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "Full name must be 1-255 characters"))]
    pub full_name: String,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,

    /// Defaults to `member`
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 255, message = "Full name must be 1-255 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,

    pub role: Option<UserRole>,

    /// Only `active` and `inactive` can be set here
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberListQuery {
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl MemberListQuery {
    pub fn page(&self) -> PageRequest {
        page_request(self.page, self.per_page)
    }
}

// ============================================================================
// Borrowing Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BorrowRequest {
    pub member_id: UserId,

    pub book_id: BookId,

    /// Defaults to today plus the configured loan period
    pub due_date: Option<NaiveDate>,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RenewRequest {
    pub new_due_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowingFilterParam {
    #[default]
    All,
    Active,
    Returned,
    Overdue,
}

impl From<BorrowingFilterParam> for BorrowingFilter {
    fn from(param: BorrowingFilterParam) -> Self {
        match param {
            BorrowingFilterParam::All => Self::All,
            BorrowingFilterParam::Active => Self::Active,
            BorrowingFilterParam::Returned => Self::Returned,
            BorrowingFilterParam::Overdue => Self::Overdue,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BorrowingListQuery {
    #[serde(default)]
    pub status: BorrowingFilterParam,
    pub member_id: Option<UserId>,
    pub book_id: Option<BookId>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl BorrowingListQuery {
    pub fn page(&self) -> PageRequest {
        page_request(self.page, self.per_page)
    }
}

// ============================================================================
// Reservation Requests
// ============================================================================

/// Members reserve for themselves; staff name the member
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReservationRequest {
    pub book_id: BookId,

    pub member_id: Option<UserId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ApproveReservationRequest {
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RejectReservationRequest {
    #[validate(length(min = 1, max = 1000, message = "Reason must be 1-1000 characters"))]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationListQuery {
    pub status: Option<ReservationStatus>,
    pub member_id: Option<UserId>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ReservationListQuery {
    pub fn page(&self) -> PageRequest {
        page_request(self.page, self.per_page)
    }
}

// ============================================================================
// Attendance Requests
// ============================================================================

/// Day for the daily attendance sheet, defaults to today
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceDateQuery {
    pub date: Option<NaiveDate>,
}

fn history_range(query: &HistoryQuery) -> Result<(), ValidationError> {
    if query.from > query.to {
        return Err(ValidationError::new("range").with_message("'from' must not be after 'to'".into()));
    }
    if (query.to - query.from).num_days() >= MAX_HISTORY_SPAN_DAYS {
        return Err(ValidationError::new("range")
            .with_message(format!("Range must span at most {MAX_HISTORY_SPAN_DAYS} days").into()));
    }
    Ok(())
}

/// Inclusive date range for a member's attendance history
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "history_range"))]
pub struct HistoryQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

// ============================================================================
// Message Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub recipient_id: UserId,

    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,
}

/// Number of activity entries to return
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

impl ActivityQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::MAX_MESSAGE_LENGTH;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_login_validation() {
        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "x".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_book_requires_copies() {
        let mut req = CreateBookRequest {
            book_code: "B-001".to_string(),
            title: "Dune".to_string(),
            author_name: "Frank Herbert".to_string(),
            isbn: "9780441013593".to_string(),
            category_id: None,
            total_copies: 0,
            status: None,
            cover_image: None,
        };
        assert!(req.validate().is_err());
        req.total_copies = 1;
        assert!(req.validate().is_ok());
        req.title = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_username_characters() {
        let mut req = CreateMemberRequest {
            username: "ada.l".to_string(),
            email: "ada@example.com".to_string(),
            full_name: "Ada Lovelace".to_string(),
            phone: None,
            role: None,
        };
        assert!(req.validate().is_ok());
        req.username = "ada lovelace".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_history_range() {
        let ok = HistoryQuery {
            from: date(1, 1),
            to: date(1, 31),
        };
        assert!(ok.validate().is_ok());

        let reversed = HistoryQuery {
            from: date(2, 1),
            to: date(1, 1),
        };
        assert!(reversed.validate().is_err());

        let too_long = HistoryQuery {
            from: date(1, 1),
            to: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_message_length() {
        let req = SendMessageRequest {
            recipient_id: UserId::new(2),
            message: "x".repeat(MAX_MESSAGE_LENGTH + 1),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_list_query_pages() {
        let query: BookListQuery =
            serde_json::from_str(r#"{"sort":"author","page":3,"per_page":500}"#).unwrap();
        let page = query.page();
        assert_eq!(page.page, 3);
        assert_eq!(page.per_page, PageRequest::MAX_PER_PAGE);
        assert_eq!(BookSort::from(query.sort), BookSort::Author);

        assert_eq!(BorrowingListQuery::default().page(), PageRequest::default());
    }

    #[test]
    fn test_search_limit_is_clamped() {
        let query = SearchQuery {
            q: "dune".to_string(),
            limit: Some(1000),
        };
        assert_eq!(query.limit(), SearchQuery::MAX_LIMIT);
        assert_eq!(SearchQuery::default().limit(), SearchQuery::DEFAULT_LIMIT);
    }
}
