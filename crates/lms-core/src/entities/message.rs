//! Direct messages between users of the same library

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::{LibraryId, MessageId, UserId};

/// Longest accepted message body, in characters
pub const MAX_MESSAGE_LENGTH: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub library_id: LibraryId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The other participant, seen from `user_id`
    pub fn counterpart(&self, user_id: UserId) -> UserId {
        if self.sender_id == user_id {
            self.recipient_id
        } else {
            self.sender_id
        }
    }

    /// Get a truncated preview of the message (for notifications)
    pub fn preview(&self, max_chars: usize) -> String {
        if self.body.chars().count() <= max_chars {
            self.body.clone()
        } else {
            let cut: String = self.body.chars().take(max_chars).collect();
            format!("{cut}...")
        }
    }
}

/// A validated message ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub library_id: LibraryId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub body: String,
}

impl NewMessage {
    pub fn new(
        library_id: LibraryId,
        sender_id: UserId,
        recipient_id: UserId,
        body: &str,
    ) -> Result<Self, DomainError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(DomainError::ValidationError(
                "Message cannot be empty".to_string(),
            ));
        }
        if body.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: MAX_MESSAGE_LENGTH,
            });
        }
        if sender_id == recipient_id {
            return Err(DomainError::ValidationError(
                "Cannot send a message to yourself".to_string(),
            ));
        }
        Ok(Self {
            library_id,
            sender_id,
            recipient_id,
            body: body.to_string(),
        })
    }
}

/// Latest message exchanged with one counterpart plus the number of unread
/// messages they sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub counterpart_id: UserId,
    pub counterpart_name: String,
    pub last_message: Message,
    pub unread_count: i64,
}
