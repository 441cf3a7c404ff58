//! HTTP API request/response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::websocket::{MessageDto, UserDto};

/// Chat room as returned by the HTTP API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDto {
    pub id: String,
    /// `None` for private chats
    pub name: Option<String>,
    pub created_by: Option<String>,
    pub is_group: bool,
    pub users: Vec<UserDto>,
    pub created_at: DateTime<Utc>,
}

/// Entry of `GET /api/chat/user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummaryDto {
    #[serde(flatten)]
    pub chat: ChatDto,
    pub last_message: Option<MessageDto>,
    pub unread_count: usize,
}

/// Response of `GET /api/chat/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDetailDto {
    #[serde(flatten)]
    pub chat: ChatDto,
    pub messages: Vec<MessageDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountDto {
    pub chat_id: String,
    pub unread_count: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    #[serde(default)]
    pub user_ids: Vec<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenameChatRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineStatusRequest {
    pub is_online: bool,
}

/// `?q=` search query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Plain acknowledgement body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessageDto {
    pub message: String,
}

impl StatusMessageDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned with every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}
