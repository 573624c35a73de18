//! Library database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for libraries table
#[derive(Debug, Clone, FromRow)]
pub struct LibraryModel {
    pub id: i64,
    pub name: String,
    pub current_book_count: i64,
    pub created_at: DateTime<Utc>,
}
