//! Activity log database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for activity_logs table
#[derive(Debug, Clone, FromRow)]
pub struct ActivityLogModel {
    pub id: i64,
    pub library_id: i64,
    pub user_id: i64,
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
