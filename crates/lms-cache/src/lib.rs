//! # lms-cache
//!
//! Redis layer for the side effects of library operations.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Notifications**: Per-user events published on `user:<id>` channels
//! - **Mail Outbox**: Outgoing mail queued on a Redis list for a delivery worker
//!
//! ## Example
//!
//! ```ignore
//! use lms_cache::{MailOutbox, RedisNotifier, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let notifier = RedisNotifier::new(pool.clone());
//! let mailer = MailOutbox::new(pool.clone());
//!
//! notifier.notify(&notification).await?;
//! mailer.send(&mail).await?;
//! ```

pub mod mail;
pub mod pool;
pub mod pubsub;

// Re-export pool types
pub use pool::{
    RedisPool, RedisPoolConfig, RedisPoolError, RedisResult,
};

// Re-export pubsub types
pub use pubsub::{
    PubSubChannel, PubSubEvent, Publisher, RedisNotifier, NOTIFICATION_EVENT, USER_CHANNEL_PREFIX,
};

// Re-export mail types
pub use mail::{MailOutbox, QueuedMail, MAIL_OUTBOX_KEY};
