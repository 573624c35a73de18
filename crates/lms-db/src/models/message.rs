//! Message database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub library_id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Latest message per counterpart, from the conversation list query
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    #[sqlx(flatten)]
    pub message: MessageModel,
    pub counterpart_id: i64,
    pub counterpart_name: String,
    pub unread_count: i64,
}
