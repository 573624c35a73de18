//! Borrowing database model

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database model for borrowings table
#[derive(Debug, Clone, FromRow)]
pub struct BorrowingModel {
    pub id: i64,
    pub library_id: i64,
    pub transaction_id: String,
    pub member_id: i64,
    pub book_id: i64,
    pub reservation_id: Option<i64>,
    pub issued_by: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub renewal_count: i32,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
