//! Mail outbox on a Redis list.
//!
//! Mails are pushed with `LPUSH` onto [`MAIL_OUTBOX_KEY`]; an external
//! delivery worker pops them with `BRPOP` and sends them, so the queue is
//! drained oldest first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use lms_core::{Mailer, OutgoingMail, RepoResult};

use crate::pool::{RedisPool, RedisResult};

/// Redis list holding queued mail
pub const MAIL_OUTBOX_KEY: &str = "mail:outbox";

/// Queue entry as read by the delivery worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedMail {
    #[serde(flatten)]
    pub mail: OutgoingMail,
    pub queued_at: DateTime<Utc>,
}

impl QueuedMail {
    #[must_use]
    pub fn new(mail: OutgoingMail) -> Self {
        Self {
            mail,
            queued_at: Utc::now(),
        }
    }
}

/// [`Mailer`] that queues mail for the delivery worker
#[derive(Clone)]
pub struct MailOutbox {
    pool: RedisPool,
}

impl MailOutbox {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Push a mail and return the queue length
    pub async fn enqueue(&self, mail: &OutgoingMail) -> RedisResult<usize> {
        let payload = serde_json::to_string(&QueuedMail::new(mail.clone()))?;
        let mut conn = self.pool.get().await?;
        let length: usize = conn.lpush(MAIL_OUTBOX_KEY, payload).await?;

        tracing::debug!(subject = %mail.subject, queue_length = length, "Mail queued");
        Ok(length)
    }

    /// Number of mails waiting for delivery
    pub async fn pending(&self) -> RedisResult<usize> {
        let mut conn = self.pool.get().await?;
        let length: usize = conn.llen(MAIL_OUTBOX_KEY).await?;
        Ok(length)
    }
}

#[async_trait]
impl Mailer for MailOutbox {
    async fn send(&self, mail: &OutgoingMail) -> RepoResult<()> {
        self.enqueue(mail).await?;
        Ok(())
    }
}
