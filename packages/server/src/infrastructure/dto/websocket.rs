//! WebSocket wire format.
//!
//! Every frame is a JSON object tagged by its `type` field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inbound frame on a room connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    #[serde(rename_all = "camelCase")]
    Message {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_to_id: Option<String>,
    },
    TypingStart,
    TypingStop,
}

/// Outbound event envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    NewMessage {
        message: MessageDto,
    },
    #[serde(rename_all = "camelCase")]
    DeleteMessage {
        message_id: String,
    },
    #[serde(rename_all = "camelCase")]
    MessageRead {
        message_id: String,
        message: MessageDto,
    },
    #[serde(rename_all = "camelCase")]
    AllMessagesRead {
        chat_id: String,
        user_id: String,
        updated_messages: Vec<MessageDto>,
    },
    #[serde(rename_all = "camelCase")]
    TypingStart {
        user_id: String,
        user_name: String,
    },
    #[serde(rename_all = "camelCase")]
    TypingStop {
        user_id: String,
    },
    #[serde(rename_all = "camelCase")]
    UserStatusUpdate {
        user_id: String,
        is_online: bool,
        last_seen_at: DateTime<Utc>,
    },
    UnreadUpdate,
    #[serde(rename_all = "camelCase")]
    ChatDeleted {
        chat_id: String,
    },
    #[serde(rename_all = "camelCase")]
    ChatNameUpdated {
        chat_id: String,
        new_name: String,
    },
    #[serde(rename_all = "camelCase")]
    UserAddedToChat {
        chat_id: String,
        user_id: String,
    },
    #[serde(rename_all = "camelCase")]
    UserRemovedFromChat {
        chat_id: String,
        user_id: String,
    },
}

/// Public user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderDto {
    pub id: String,
    pub name: String,
}

/// Message with sender and reply target expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub content: String,
    pub reply_to_id: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub sender: SenderDto,
    pub reply_to: Option<ReplyDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyDto {
    pub id: String,
    pub content: String,
    pub sender: SenderDto,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_frame_with_reply() {
        // テスト項目: replyToId 付きのメッセージフレームをパースできる
        // given (前提条件):
        let json = r#"{"type":"message","content":"hi","replyToId":"m1"}"#;

        // when (操作):
        let frame: ClientFrame = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            frame,
            ClientFrame::Message {
                content: "hi".to_string(),
                reply_to_id: Some("m1".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_message_frame_without_reply() {
        // テスト項目: replyToId は省略可能
        // given (前提条件):
        let json = r#"{"type":"message","content":"hi"}"#;

        // when (操作):
        let frame: ClientFrame = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert!(matches!(frame, ClientFrame::Message { reply_to_id: None, .. }));
    }

    #[test]
    fn test_parse_typing_frames() {
        // テスト項目: typing_start / typing_stop をパースできる
        // given (前提条件):
        let start = r#"{"type":"typing_start"}"#;
        let stop = r#"{"type":"typing_stop"}"#;

        // when (操作):
        let start: ClientFrame = serde_json::from_str(start).unwrap();
        let stop: ClientFrame = serde_json::from_str(stop).unwrap();

        // then (期待する結果):
        assert_eq!(start, ClientFrame::TypingStart);
        assert_eq!(stop, ClientFrame::TypingStop);
    }

    #[test]
    fn test_malformed_frames_are_rejected() {
        // テスト項目: 不正なフレームはパースエラーになる
        // given (前提条件):
        let cases = [
            "not json",
            r#"{"type":"unknown"}"#,
            r#"{"type":"message"}"#,
            r#"{"content":"no tag"}"#,
        ];

        // when (操作):
        let results: Vec<bool> = cases
            .iter()
            .map(|json| serde_json::from_str::<ClientFrame>(json).is_err())
            .collect();

        // then (期待する結果):
        assert!(results.into_iter().all(|is_err| is_err));
    }

    #[test]
    fn test_unread_update_has_only_the_tag() {
        // テスト項目: unread_update は type フィールドのみを持つ
        // given (前提条件):
        let envelope = Envelope::UnreadUpdate;

        // when (操作):
        let json = serde_json::to_string(&envelope).unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"unread_update"}"#);
    }

    #[test]
    fn test_typing_stop_omits_user_name() {
        // テスト項目: typing_stop は userName を含まない
        // given (前提条件):
        let envelope = Envelope::TypingStop {
            user_id: "u1".to_string(),
        };

        // when (操作):
        let value = serde_json::to_value(&envelope).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            serde_json::json!({"type": "typing_stop", "userId": "u1"})
        );
    }
}
