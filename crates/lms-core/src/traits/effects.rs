//! Side-effect ports: member notifications, outgoing mail and cover storage.
//!
//! Callers treat failures of these as non-fatal: the primary write has
//! already happened, so errors are logged and dropped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RepoResult;
use crate::value_objects::{CoverUpload, LibraryId, UserId};

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Borrowing,
    Return,
    Renewal,
    Reservation,
    Attendance,
    Message,
    Account,
}

/// A message for one user's notification feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub library_id: LibraryId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        library_id: LibraryId,
        user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            library_id,
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> RepoResult<()>;
}

/// A plain-text email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> RepoResult<()>;
}

/// Storage for book cover images
#[async_trait]
pub trait CoverStore: Send + Sync {
    /// Store a validated upload and return its relative path,
    /// `books/<unique>_<book_code>.<ext>`
    async fn save(&self, book_code: &str, upload: &CoverUpload) -> RepoResult<String>;

    /// Remove a stored cover. Missing files are not an error.
    async fn remove(&self, path: &str) -> RepoResult<()>;
}
