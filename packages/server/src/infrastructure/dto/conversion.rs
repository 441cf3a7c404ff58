//! Conversion logic from domain entities and events to DTOs.

use crate::domain::{
    ChatDetail, ChatEvent, ChatRoom, ChatSummary, MessageDetail, ReplyPreview, UnreadCount, User,
};
use crate::infrastructure::dto::{
    http::{ChatDetailDto, ChatDto, ChatSummaryDto, UnreadCountDto},
    websocket::{Envelope, MessageDto, ReplyDto, SenderDto, UserDto},
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_str().to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            is_online: user.is_online,
            last_seen_at: user.last_seen_at,
        }
    }
}

impl From<&User> for SenderDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_str().to_string(),
            name: user.name.clone(),
        }
    }
}

impl From<ReplyPreview> for ReplyDto {
    fn from(reply: ReplyPreview) -> Self {
        Self {
            id: reply.message.id.into_string(),
            content: reply.message.content.into_string(),
            sender: SenderDto::from(&reply.sender),
            created_at: reply.message.created_at,
        }
    }
}

impl From<MessageDetail> for MessageDto {
    fn from(detail: MessageDetail) -> Self {
        let sender = SenderDto::from(&detail.sender);
        let message = detail.message;
        Self {
            id: message.id.into_string(),
            chat_id: message.chat_id.into_string(),
            sender_id: message.sender_id.into_string(),
            content: message.content.into_string(),
            reply_to_id: message.reply_to_id.map(|id| id.into_string()),
            is_read: message.is_read,
            read_at: message.read_at,
            created_at: message.created_at,
            sender,
            reply_to: detail.reply_to.map(ReplyDto::from),
        }
    }
}

impl ChatDto {
    pub fn new(chat: ChatRoom, members: &[User]) -> Self {
        let is_group = chat.is_group();
        let (name, created_by) = chat.kind.into_storage();
        Self {
            id: chat.id.into_string(),
            name,
            created_by: created_by.map(|id| id.into_string()),
            is_group,
            users: members.iter().map(UserDto::from).collect(),
            created_at: chat.created_at,
        }
    }
}

impl From<ChatSummary> for ChatSummaryDto {
    fn from(summary: ChatSummary) -> Self {
        Self {
            chat: ChatDto::new(summary.chat, &summary.members),
            last_message: summary.last_message.map(MessageDto::from),
            unread_count: summary.unread_count,
        }
    }
}

impl From<ChatDetail> for ChatDetailDto {
    fn from(detail: ChatDetail) -> Self {
        Self {
            chat: ChatDto::new(detail.chat, &detail.members),
            messages: detail.messages.into_iter().map(MessageDto::from).collect(),
        }
    }
}

impl From<UnreadCount> for UnreadCountDto {
    fn from(count: UnreadCount) -> Self {
        Self {
            chat_id: count.chat_id.into_string(),
            unread_count: count.unread_count,
        }
    }
}

// ========================================
// Domain Event → Envelope
// ========================================

impl From<ChatEvent> for Envelope {
    fn from(event: ChatEvent) -> Self {
        match event {
            ChatEvent::NewMessage { message } => Self::NewMessage {
                message: message.into(),
            },
            ChatEvent::DeleteMessage { message_id } => Self::DeleteMessage {
                message_id: message_id.into_string(),
            },
            ChatEvent::MessageRead {
                message_id,
                message,
            } => Self::MessageRead {
                message_id: message_id.into_string(),
                message: message.into(),
            },
            ChatEvent::AllMessagesRead {
                chat_id,
                user_id,
                updated_messages,
            } => Self::AllMessagesRead {
                chat_id: chat_id.into_string(),
                user_id: user_id.into_string(),
                updated_messages: updated_messages.into_iter().map(MessageDto::from).collect(),
            },
            ChatEvent::TypingStart { user_id, user_name } => Self::TypingStart {
                user_id: user_id.into_string(),
                user_name,
            },
            ChatEvent::TypingStop { user_id } => Self::TypingStop {
                user_id: user_id.into_string(),
            },
            ChatEvent::UserStatusUpdate {
                user_id,
                is_online,
                last_seen_at,
            } => Self::UserStatusUpdate {
                user_id: user_id.into_string(),
                is_online,
                last_seen_at,
            },
            ChatEvent::UnreadUpdate => Self::UnreadUpdate,
            ChatEvent::ChatDeleted { chat_id } => Self::ChatDeleted {
                chat_id: chat_id.into_string(),
            },
            ChatEvent::ChatNameUpdated { chat_id, new_name } => Self::ChatNameUpdated {
                chat_id: chat_id.into_string(),
                new_name: new_name.into_string(),
            },
            ChatEvent::UserAddedToChat { chat_id, user_id } => Self::UserAddedToChat {
                chat_id: chat_id.into_string(),
                user_id: user_id.into_string(),
            },
            ChatEvent::UserRemovedFromChat { chat_id, user_id } => Self::UserRemovedFromChat {
                chat_id: chat_id.into_string(),
                user_id: user_id.into_string(),
            },
        }
    }
}
