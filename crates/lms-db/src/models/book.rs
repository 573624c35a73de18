//! Book database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for books table
#[derive(Debug, Clone, FromRow)]
pub struct BookModel {
    pub id: i64,
    pub library_id: i64,
    pub book_code: String,
    pub title: String,
    pub author_name: String,
    pub isbn: String,
    pub category_id: Option<i64>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub status: String,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
