//! Activity log entries written after librarian actions

use chrono::{DateTime, Utc};

use crate::value_objects::{ActivityId, LibraryId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLog {
    pub id: ActivityId,
    pub library_id: LibraryId,
    pub user_id: UserId,
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting an activity log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub library_id: LibraryId,
    pub user_id: UserId,
    pub action: String,
    pub description: String,
}

impl NewActivity {
    pub fn new(
        library_id: LibraryId,
        user_id: UserId,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            library_id,
            user_id,
            action: action.into(),
            description: description.into(),
        }
    }
}
