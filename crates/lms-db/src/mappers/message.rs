//! Message model -> entity mappers

use lms_core::{ConversationSummary, LibraryId, Message, MessageId, UserId};

use crate::models::{ConversationModel, MessageModel};

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: MessageId::new(model.id),
            library_id: LibraryId::new(model.library_id),
            sender_id: UserId::new(model.sender_id),
            recipient_id: UserId::new(model.recipient_id),
            body: model.message,
            is_read: model.is_read,
            created_at: model.created_at,
        }
    }
}

impl From<ConversationModel> for ConversationSummary {
    fn from(model: ConversationModel) -> Self {
        ConversationSummary {
            counterpart_id: UserId::new(model.counterpart_id),
            counterpart_name: model.counterpart_name,
            last_message: model.message.into(),
            unread_count: model.unread_count,
        }
    }
}
