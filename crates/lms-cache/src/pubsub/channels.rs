//! Pub/Sub channel naming.

use lms_core::UserId;

/// Channel prefix for events addressed to one user
pub const USER_CHANNEL_PREFIX: &str = "user:";

/// Pub/Sub channel types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Events for a specific user (all their sessions)
    User(UserId),
}

impl PubSubChannel {
    #[must_use]
    pub fn user(user_id: UserId) -> Self {
        Self::User(user_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::User(id) => format!("{USER_CHANNEL_PREFIX}{id}"),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        name.strip_prefix(USER_CHANNEL_PREFIX)?
            .parse()
            .ok()
            .map(Self::User)
    }
}
