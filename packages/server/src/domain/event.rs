//! Events fanned out to live connections.
//!
//! One variant per wire event. Constructed right after a successful mutation (or a
//! presence change), serialized once by the pusher and then dropped; never stored.

use chrono::{DateTime, Utc};

use super::{
    entity::MessageDetail,
    value_object::{ChatId, ChatName, MessageId, UserId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    NewMessage {
        message: MessageDetail,
    },
    DeleteMessage {
        message_id: MessageId,
    },
    MessageRead {
        message_id: MessageId,
        message: MessageDetail,
    },
    AllMessagesRead {
        chat_id: ChatId,
        user_id: UserId,
        updated_messages: Vec<MessageDetail>,
    },
    TypingStart {
        user_id: UserId,
        user_name: String,
    },
    TypingStop {
        user_id: UserId,
    },
    UserStatusUpdate {
        user_id: UserId,
        is_online: bool,
        last_seen_at: DateTime<Utc>,
    },
    UnreadUpdate,
    ChatDeleted {
        chat_id: ChatId,
    },
    ChatNameUpdated {
        chat_id: ChatId,
        new_name: ChatName,
    },
    UserAddedToChat {
        chat_id: ChatId,
        user_id: UserId,
    },
    UserRemovedFromChat {
        chat_id: ChatId,
        user_id: UserId,
    },
}

impl ChatEvent {
    /// Wire tag of the event (`type` field)
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewMessage { .. } => "new_message",
            Self::DeleteMessage { .. } => "delete_message",
            Self::MessageRead { .. } => "message_read",
            Self::AllMessagesRead { .. } => "all_messages_read",
            Self::TypingStart { .. } => "typing_start",
            Self::TypingStop { .. } => "typing_stop",
            Self::UserStatusUpdate { .. } => "user_status_update",
            Self::UnreadUpdate => "unread_update",
            Self::ChatDeleted { .. } => "chat_deleted",
            Self::ChatNameUpdated { .. } => "chat_name_updated",
            Self::UserAddedToChat { .. } => "user_added_to_chat",
            Self::UserRemovedFromChat { .. } => "user_removed_from_chat",
        }
    }
}
