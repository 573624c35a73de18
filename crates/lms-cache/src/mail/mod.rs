//! Outgoing mail queue.

mod outbox;

pub use outbox::{MailOutbox, QueuedMail, MAIL_OUTBOX_KEY};
