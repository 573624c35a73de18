//! Redis Pub/Sub for member notifications.

mod channels;
mod notifier;
mod publisher;

pub use channels::{PubSubChannel, USER_CHANNEL_PREFIX};
pub use notifier::{RedisNotifier, NOTIFICATION_EVENT};
pub use publisher::{PubSubEvent, Publisher};
