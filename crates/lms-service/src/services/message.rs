//! Message service
//!
//! Direct messages between users of the same library.

use lms_core::{DomainError, NewMessage, Notification, NotificationKind, RequestContext, UserId};
use tracing::{info, instrument};

use crate::dto::{
    ConversationResponse, DirectMessageResponse, SendMessageRequest, UnreadCountResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Characters of a message shown in the recipient's notification
const NOTIFICATION_PREVIEW_CHARS: usize = 50;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Latest message per counterpart, newest conversation first
    #[instrument(skip(self))]
    pub async fn conversations(
        &self,
        rc: &RequestContext,
    ) -> ServiceResult<Vec<ConversationResponse>> {
        let summaries = self
            .ctx
            .message_repo()
            .conversations(rc.library_id, rc.user_id)
            .await?;
        Ok(summaries.into_iter().map(ConversationResponse::from).collect())
    }

    /// Messages exchanged with `other_id`, oldest first. Everything the
    /// counterpart sent to the caller is marked read.
    #[instrument(skip(self))]
    pub async fn conversation(
        &self,
        rc: &RequestContext,
        other_id: UserId,
    ) -> ServiceResult<Vec<DirectMessageResponse>> {
        self.ensure_user(rc, other_id).await?;

        let repo = self.ctx.message_repo();
        let messages = repo.between(rc.library_id, rc.user_id, other_id).await?;
        let marked = repo.mark_read(rc.library_id, other_id, rc.user_id).await?;
        if marked > 0 {
            info!(marked, counterpart = %other_id, "Messages marked read");
        }

        Ok(messages
            .into_iter()
            .map(|mut m| {
                if m.sender_id == other_id {
                    m.is_read = true;
                }
                DirectMessageResponse::from(m)
            })
            .collect())
    }

    #[instrument(skip(self, request), fields(recipient_id = %request.recipient_id))]
    pub async fn send(
        &self,
        rc: &RequestContext,
        request: SendMessageRequest,
    ) -> ServiceResult<DirectMessageResponse> {
        let new_message =
            NewMessage::new(rc.library_id, rc.user_id, request.recipient_id, &request.message)?;
        self.ensure_user(rc, new_message.recipient_id).await?;

        let message = self.ctx.message_repo().create(&new_message).await?;

        info!(message_id = %message.id, "Message sent");

        self.ctx
            .notify(Notification::new(
                rc.library_id,
                message.recipient_id,
                NotificationKind::Message,
                "New message",
                message.preview(NOTIFICATION_PREVIEW_CHARS),
            ))
            .await;

        Ok(DirectMessageResponse::from(message))
    }

    #[instrument(skip(self))]
    pub async fn unread_count(&self, rc: &RequestContext) -> ServiceResult<UnreadCountResponse> {
        let unread = self
            .ctx
            .message_repo()
            .unread_count(rc.library_id, rc.user_id)
            .await?;
        Ok(UnreadCountResponse { unread })
    }

    async fn ensure_user(&self, rc: &RequestContext, user_id: UserId) -> ServiceResult<()> {
        self.ctx
            .member_repo()
            .find_by_id(rc.library_id, user_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::UserNotFound(user_id).into())
    }
}
