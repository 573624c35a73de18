//! Notifier backed by Redis Pub/Sub.

use async_trait::async_trait;

use lms_core::{Notification, Notifier, RepoResult};

use crate::pool::RedisPool;
use crate::pubsub::{PubSubChannel, PubSubEvent, Publisher};

/// Event type carried by notification messages
pub const NOTIFICATION_EVENT: &str = "NOTIFICATION";

/// Publishes each notification on the recipient's `user:<id>` channel
#[derive(Clone)]
pub struct RedisNotifier {
    publisher: Publisher,
}

impl RedisNotifier {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            publisher: Publisher::new(pool),
        }
    }
}

/// Build the pub/sub event for a notification
pub(crate) fn notification_event(
    notification: &Notification,
) -> Result<PubSubEvent, serde_json::Error> {
    Ok(PubSubEvent::new(
        NOTIFICATION_EVENT,
        serde_json::to_value(notification)?,
    ))
}

#[async_trait]
impl Notifier for RedisNotifier {
    async fn notify(&self, notification: &Notification) -> RepoResult<()> {
        let event = notification_event(notification)
            .map_err(|e| lms_core::DomainError::CacheError(e.to_string()))?;
        self.publisher
            .publish(&PubSubChannel::user(notification.user_id), &event)
            .await?;
        Ok(())
    }
}
