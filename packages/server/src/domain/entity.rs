//! Entities owned by the storage collaborator and the read models built from them.

use chrono::{DateTime, Utc};

use super::{
    error::ValueObjectError,
    value_object::{ChatId, ChatName, MessageContent, MessageId, UserId},
};

/// A registered user and their presence record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: UserId, name: String, email: String) -> Self {
        Self {
            id,
            name,
            email,
            is_online: false,
            last_seen_at: None,
        }
    }
}

/// Presence snapshot of a single user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub user_id: UserId,
    pub is_online: bool,
    pub last_seen_at: DateTime<Utc>,
}

/// Private (1:1, unnamed) or group (named, with a creator) room.
///
/// Storage keeps a nullable name plus a nullable creator; a present name marks a group.
/// [`ChatKind::from_storage`] translates that representation right after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group { name: ChatName, creator_id: UserId },
}

impl ChatKind {
    pub fn from_storage(
        name: Option<String>,
        created_by: Option<UserId>,
    ) -> Result<Self, ValueObjectError> {
        match name {
            None => Ok(Self::Private),
            Some(name) => {
                let creator_id =
                    created_by.ok_or_else(|| ValueObjectError::GroupWithoutCreator(name.clone()))?;
                Ok(Self::Group {
                    name: ChatName::new(&name)?,
                    creator_id,
                })
            }
        }
    }

    pub fn into_storage(self) -> (Option<String>, Option<UserId>) {
        match self {
            Self::Private => (None, None),
            Self::Group { name, creator_id } => (Some(name.into_string()), Some(creator_id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRoom {
    pub id: ChatId,
    pub kind: ChatKind,
    pub member_ids: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl ChatRoom {
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.member_ids.iter().any(|id| id == user_id)
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ChatKind::Group { .. })
    }

    pub fn name(&self) -> Option<&ChatName> {
        match &self.kind {
            ChatKind::Group { name, .. } => Some(name),
            ChatKind::Private => None,
        }
    }

    pub fn creator_id(&self) -> Option<&UserId> {
        match &self.kind {
            ChatKind::Group { creator_id, .. } => Some(creator_id),
            ChatKind::Private => None,
        }
    }
}

/// A persisted chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub reply_to_id: Option<MessageId>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether `reader` still has this message as unread
    pub fn is_unread_for(&self, reader: &UserId) -> bool {
        !self.is_read && &self.sender_id != reader
    }
}

/// Input for creating a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub reply_to_id: Option<MessageId>,
    pub created_at: DateTime<Utc>,
}

/// Message with its sender and reply target expanded, as clients render it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDetail {
    pub message: Message,
    pub sender: User,
    pub reply_to: Option<ReplyPreview>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPreview {
    pub message: Message,
    pub sender: User,
}

/// One entry of the caller's chat list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub chat: ChatRoom,
    pub members: Vec<User>,
    pub last_message: Option<MessageDetail>,
    pub unread_count: usize,
}

impl ChatSummary {
    /// Last activity: newest message, else the chat creation time
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_message
            .as_ref()
            .map(|detail| detail.message.created_at)
            .unwrap_or(self.chat.created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatDetail {
    pub chat: ChatRoom,
    pub members: Vec<User>,
    pub messages: Vec<MessageDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadCount {
    pub chat_id: ChatId,
    pub unread_count: usize,
}
