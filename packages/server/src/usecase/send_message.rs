//! UseCase: メッセージ送信（Message Gateway の `message` フレーム）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージの保存、`new_message` のルーム配信、`unread_update` の未読フィード配信
//!
//! ### なぜこのテストが必要か
//! - 失敗した変更が配信されないことを保証
//! - 返信先の検証ポリシー（見つからなければリンクを外して送信）を保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：メンバーの送信、同じルームの返信
//! - 異常系：空の本文、メンバーから外されたユーザーの送信
//! - エッジケース：別ルームのメッセージへの返信

use std::sync::Arc;

use hanashi_shared::time::Clock;

use crate::domain::{
    ChatEvent, ChatId, ChatRepository, MessageContent, MessageDetail, MessageId,
    MessagePusher, MessageRepository, NewMessage, User, UserRepository,
};

use super::{detail, error::SendMessageError, fanout};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chats,
            messages,
            users,
            message_pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `chat_id` - 接続が紐づくチャット
    /// * `sender` - 接続のユーザー
    /// * `content` - 受信した本文（未検証）
    /// * `reply_to_id` - 返信先（同じチャットに存在しなければ無視）
    ///
    /// # Returns
    ///
    /// * `Ok(MessageDetail)` - 保存・配信されたメッセージ
    /// * `Err(SendMessageError)` - 検証・認可・保存の失敗（配信なし）
    pub async fn execute(
        &self,
        chat_id: &ChatId,
        sender: &User,
        content: String,
        reply_to_id: Option<String>,
    ) -> Result<MessageDetail, SendMessageError> {
        // 1. 本文の検証
        let content = MessageContent::new(content)?;

        // 2. メンバーシップの再確認
        let chat = self
            .chats
            .find_chat(chat_id)
            .await?
            .ok_or_else(|| SendMessageError::ChatNotFound(chat_id.to_string()))?;
        if !chat.is_member(&sender.id) {
            return Err(SendMessageError::NotAMember {
                chat_id: chat_id.to_string(),
                user_id: sender.id.to_string(),
            });
        }

        // 3. 返信先の解決
        let reply_to_id = match reply_to_id {
            Some(raw) => self.resolve_reply_target(chat_id, raw).await?,
            None => None,
        };

        // 4. 保存
        let message = self
            .messages
            .create_message(NewMessage {
                chat_id: chat_id.clone(),
                sender_id: sender.id.clone(),
                content,
                reply_to_id,
                created_at: self.clock.now(),
            })
            .await?;
        let message = detail::expand(self.users.as_ref(), self.messages.as_ref(), message).await?;

        // 5. 配信
        let event = ChatEvent::NewMessage {
            message: message.clone(),
        };
        fanout::to_room(self.message_pusher.as_ref(), chat_id, &event).await;
        fanout::to_unread_feed(self.message_pusher.as_ref()).await;

        Ok(message)
    }

    async fn resolve_reply_target(
        &self,
        chat_id: &ChatId,
        raw: String,
    ) -> Result<Option<MessageId>, SendMessageError> {
        let Ok(reply_to_id) = MessageId::new(raw) else {
            return Ok(None);
        };
        match self
            .messages
            .find_message_in_chat(&reply_to_id, chat_id)
            .await?
        {
            Some(_) => Ok(Some(reply_to_id)),
            None => {
                tracing::warn!(
                    "Reply target '{}' not found in chat '{}', sending without reply",
                    reply_to_id,
                    chat_id
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChatKind, ConnectionId, Subscriber, ValueObjectError},
        infrastructure::{
            message_pusher::WebSocketMessagePusher,
            repository::{InMemoryChatRepository, InMemoryUserRepository},
        },
    };
    use hanashi_shared::time::FixedClock;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Fixture {
        chats: Arc<InMemoryChatRepository>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: SendMessageUseCase,
        alice: User,
        bob: User,
        carol: User,
    }

    async fn fixture() -> Fixture {
        let chats = Arc::new(InMemoryChatRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let alice = users
            .create_user("alice".to_string(), "alice@example.com".to_string())
            .await
            .unwrap();
        let bob = users
            .create_user("bob".to_string(), "bob@example.com".to_string())
            .await
            .unwrap();
        let carol = users
            .create_user("carol".to_string(), "carol@example.com".to_string())
            .await
            .unwrap();
        let usecase = SendMessageUseCase::new(
            chats.clone(),
            chats.clone(),
            users,
            pusher.clone(),
            Arc::new(FixedClock::from_millis(1_704_067_200_000)),
        );
        Fixture {
            chats,
            pusher,
            usecase,
            alice,
            bob,
            carol,
        }
    }

    async fn listen(
        pusher: &WebSocketMessagePusher,
        chat_id: &ChatId,
        user: &User,
    ) -> UnboundedReceiver<String> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        pusher
            .attach(
                chat_id.clone(),
                Subscriber::new(ConnectionId::generate(), user.id.clone(), tx),
            )
            .await;
        rx
    }

    async fn listen_unread(
        pusher: &WebSocketMessagePusher,
        user: &User,
    ) -> UnboundedReceiver<String> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        pusher
            .attach_unread(Subscriber::new(ConnectionId::generate(), user.id.clone(), tx))
            .await;
        rx
    }

    fn parse(raw: String) -> serde_json::Value {
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_send_message_fans_out_to_room_and_unread_feed() {
        // テスト項目: 送信したメッセージがルームの全接続と未読フィードに配信される
        // given (前提条件):
        let f = fixture().await;
        let chat = f
            .chats
            .create_chat(
                ChatKind::Private,
                vec![f.alice.id.clone(), f.bob.id.clone()],
                chrono::Utc::now(),
            )
            .await
            .unwrap();
        let mut alice_rx = listen(&f.pusher, &chat.id, &f.alice).await;
        let mut bob_rx = listen(&f.pusher, &chat.id, &f.bob).await;
        let mut unread_rx = listen_unread(&f.pusher, &f.bob).await;

        // when (操作):
        let sent = f
            .usecase
            .execute(&chat.id, &f.alice, "hi".to_string(), None)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(sent.message.content.as_str(), "hi");
        assert_eq!(sent.message.sender_id, f.alice.id);
        assert!(!sent.message.is_read);
        for rx in [&mut alice_rx, &mut bob_rx] {
            let pushed = parse(rx.recv().await.unwrap());
            assert_eq!(pushed["type"], "new_message");
            assert_eq!(pushed["message"]["content"], "hi");
            assert_eq!(pushed["message"]["sender"]["name"], "alice");
            assert!(rx.try_recv().is_err());
        }
        assert_eq!(
            parse(unread_rx.recv().await.unwrap()),
            serde_json::json!({"type": "unread_update"})
        );
        assert_eq!(f.chats.find_messages(&chat.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_to_message_in_other_chat_is_dropped() {
        // テスト項目: 別チャットのメッセージへの返信はリンクなしで送信される
        // given (前提条件):
        let f = fixture().await;
        let r1 = f
            .chats
            .create_chat(
                ChatKind::Private,
                vec![f.alice.id.clone(), f.bob.id.clone()],
                chrono::Utc::now(),
            )
            .await
            .unwrap();
        let r2 = f
            .chats
            .create_chat(
                ChatKind::Private,
                vec![f.alice.id.clone(), f.carol.id.clone()],
                chrono::Utc::now(),
            )
            .await
            .unwrap();
        let elsewhere = f
            .usecase
            .execute(&r2.id, &f.carol, "in r2".to_string(), None)
            .await
            .unwrap();
        let mut bob_rx = listen(&f.pusher, &r1.id, &f.bob).await;

        // when (操作):
        let sent = f
            .usecase
            .execute(
                &r1.id,
                &f.alice,
                "reply".to_string(),
                Some(elsewhere.message.id.to_string()),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(sent.message.reply_to_id, None);
        assert_eq!(sent.reply_to, None);
        assert_eq!(parse(bob_rx.recv().await.unwrap())["type"], "new_message");
    }

    #[tokio::test]
    async fn test_reply_in_same_chat_is_expanded() {
        // テスト項目: 同じチャットへの返信は返信先が展開される
        // given (前提条件):
        let f = fixture().await;
        let chat = f
            .chats
            .create_chat(
                ChatKind::Private,
                vec![f.alice.id.clone(), f.bob.id.clone()],
                chrono::Utc::now(),
            )
            .await
            .unwrap();
        let question = f
            .usecase
            .execute(&chat.id, &f.bob, "lunch?".to_string(), None)
            .await
            .unwrap();

        // when (操作):
        let answer = f
            .usecase
            .execute(
                &chat.id,
                &f.alice,
                "yes".to_string(),
                Some(question.message.id.to_string()),
            )
            .await
            .unwrap();

        // then (期待する結果):
        let reply = answer.reply_to.unwrap();
        assert_eq!(reply.message.id, question.message.id);
        assert_eq!(reply.sender.id, f.bob.id);
    }

    #[tokio::test]
    async fn test_blank_content_is_rejected_without_broadcast() {
        // テスト項目: 空白のみの本文は検証エラーで、何も配信されない
        // given (前提条件):
        let f = fixture().await;
        let chat = f
            .chats
            .create_chat(
                ChatKind::Private,
                vec![f.alice.id.clone(), f.bob.id.clone()],
                chrono::Utc::now(),
            )
            .await
            .unwrap();
        let mut bob_rx = listen(&f.pusher, &chat.id, &f.bob).await;

        // when (操作):
        let result = f
            .usecase
            .execute(&chat.id, &f.alice, "   ".to_string(), None)
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::Validation(ValueObjectError::EmptyContent))
        );
        assert!(bob_rx.try_recv().is_err());
        assert!(f.chats.find_messages(&chat.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_removed_member_cannot_send() {
        // テスト項目: メンバーから外されたユーザーの送信は拒否される
        // given (前提条件):
        let f = fixture().await;
        let chat = f
            .chats
            .create_chat(
                ChatKind::Group {
                    name: crate::domain::ChatName::new("Team").unwrap(),
                    creator_id: f.alice.id.clone(),
                },
                vec![f.alice.id.clone(), f.bob.id.clone(), f.carol.id.clone()],
                chrono::Utc::now(),
            )
            .await
            .unwrap();
        f.chats.remove_member(&chat.id, &f.carol.id).await.unwrap();
        let mut alice_rx = listen(&f.pusher, &chat.id, &f.alice).await;

        // when (操作):
        let result = f
            .usecase
            .execute(&chat.id, &f.carol, "still here?".to_string(), None)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SendMessageError::NotAMember { .. })));
        assert!(alice_rx.try_recv().is_err());
    }
}
