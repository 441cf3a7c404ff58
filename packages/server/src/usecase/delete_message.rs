//! UseCase: メッセージ削除
//!
//! 送信者本人のみ削除でき、成功時に `delete_message` をルームへ、`unread_update` を
//! 未読フィードへ配信します。

use std::sync::Arc;

use crate::domain::{
    ChatEvent, ChatId, ChatRepository, MessageId, MessagePusher, MessageRepository, UserId,
};

use super::{access, error::ChatActionError, fanout};

pub struct DeleteMessageUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DeleteMessageUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            chats,
            messages,
            message_pusher,
        }
    }

    pub async fn execute(
        &self,
        chat_id: &ChatId,
        message_id: &MessageId,
        user_id: &UserId,
    ) -> Result<(), ChatActionError> {
        access::member_chat(self.chats.as_ref(), chat_id, user_id).await?;

        let message = self
            .messages
            .find_message_in_chat(message_id, chat_id)
            .await?
            .ok_or_else(|| ChatActionError::NotFound("Message not found".to_string()))?;
        if &message.sender_id != user_id {
            return Err(ChatActionError::Forbidden(
                "You can only delete your own messages".to_string(),
            ));
        }

        self.messages.delete_message(message_id).await?;
        tracing::info!("Message '{}' deleted from chat '{}'", message_id, chat_id);

        let event = ChatEvent::DeleteMessage {
            message_id: message_id.clone(),
        };
        fanout::to_room(self.message_pusher.as_ref(), chat_id, &event).await;
        fanout::to_unread_feed(self.message_pusher.as_ref()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChatKind, ConnectionId, MessageContent, NewMessage, Subscriber},
        infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryChatRepository},
    };
    use chrono::Utc;

    fn uid(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    async fn setup() -> (
        Arc<InMemoryChatRepository>,
        Arc<WebSocketMessagePusher>,
        DeleteMessageUseCase,
        ChatId,
        MessageId,
    ) {
        let chats = Arc::new(InMemoryChatRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let chat = chats
            .create_chat(ChatKind::Private, vec![uid("u1"), uid("u2")], Utc::now())
            .await
            .unwrap();
        let message = chats
            .create_message(NewMessage {
                chat_id: chat.id.clone(),
                sender_id: uid("u1"),
                content: MessageContent::new("oops".to_string()).unwrap(),
                reply_to_id: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let usecase = DeleteMessageUseCase::new(chats.clone(), chats.clone(), pusher.clone());
        (chats, pusher, usecase, chat.id, message.id)
    }

    #[tokio::test]
    async fn test_sender_deletes_own_message() {
        // テスト項目: 送信者は自分のメッセージを削除でき、削除イベントが配信される
        // given (前提条件):
        let (chats, pusher, usecase, chat_id, message_id) = setup().await;
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        pusher
            .attach(chat_id.clone(), Subscriber::new(ConnectionId::generate(), uid("u2"), tx))
            .await;

        // when (操作):
        let result = usecase.execute(&chat_id, &message_id, &uid("u1")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(chats.find_message(&message_id).await.unwrap(), None);
        let pushed: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(
            pushed,
            serde_json::json!({"type": "delete_message", "messageId": message_id.as_str()})
        );
    }

    #[tokio::test]
    async fn test_other_member_cannot_delete() {
        // テスト項目: 他人のメッセージは削除できず、何も配信されない
        // given (前提条件):
        let (chats, pusher, usecase, chat_id, message_id) = setup().await;
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        pusher
            .attach(chat_id.clone(), Subscriber::new(ConnectionId::generate(), uid("u1"), tx))
            .await;

        // when (操作):
        let result = usecase.execute(&chat_id, &message_id, &uid("u2")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ChatActionError::Forbidden(_))));
        assert!(chats.find_message(&message_id).await.unwrap().is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_outsider_is_forbidden() {
        // テスト項目: チャットのメンバーでなければ拒否される
        // given (前提条件):
        let (_chats, _pusher, usecase, chat_id, message_id) = setup().await;

        // when (操作):
        let result = usecase.execute(&chat_id, &message_id, &uid("u3")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ChatActionError::Forbidden(_))));
    }
}
