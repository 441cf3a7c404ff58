//! UseCase: グループのメンバー管理（追加・削除・退出）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - MembershipUseCase::add() / remove() / leave() メソッド
//! - 作成者のみが追加・削除でき、作成者自身は削除・退出できないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成者による追加・削除、メンバーの退出
//! - 異常系：作成者以外の操作（変更なし・配信なし）、Private チャットでの操作

use std::sync::Arc;

use crate::domain::{
    ChatEvent, ChatId, ChatRepository, ChatRoom, MessagePusher, UserId, UserRepository,
};

use super::{access, error::ChatActionError, fanout};

pub struct MembershipUseCase {
    chats: Arc<dyn ChatRepository>,
    users: Arc<dyn UserRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl MembershipUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        users: Arc<dyn UserRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            chats,
            users,
            message_pusher,
        }
    }

    /// 作成者がメンバーを追加
    pub async fn add(
        &self,
        chat_id: &ChatId,
        actor: &UserId,
        new_member: &UserId,
    ) -> Result<ChatRoom, ChatActionError> {
        let chat = access::member_chat(self.chats.as_ref(), chat_id, actor).await?;
        access::require_group_creator(&chat, actor, "add members")?;
        if self.users.find_user(new_member).await?.is_none() {
            return Err(ChatActionError::NotFound("User not found".to_string()));
        }
        if chat.is_member(new_member) {
            return Err(ChatActionError::Validation(
                "User is already a member of this chat".to_string(),
            ));
        }

        let chat = self.chats.add_member(chat_id, new_member).await?;
        tracing::info!("User '{}' added to chat '{}'", new_member, chat_id);

        let event = ChatEvent::UserAddedToChat {
            chat_id: chat_id.clone(),
            user_id: new_member.clone(),
        };
        fanout::to_room(self.message_pusher.as_ref(), chat_id, &event).await;
        Ok(chat)
    }

    /// 作成者がメンバーを削除（作成者自身は削除できない）
    pub async fn remove(
        &self,
        chat_id: &ChatId,
        actor: &UserId,
        member: &UserId,
    ) -> Result<ChatRoom, ChatActionError> {
        let chat = access::member_chat(self.chats.as_ref(), chat_id, actor).await?;
        access::require_group_creator(&chat, actor, "remove members")?;
        if member == actor {
            return Err(ChatActionError::Validation(
                "The group creator cannot be removed".to_string(),
            ));
        }
        if !chat.is_member(member) {
            return Err(ChatActionError::Validation(
                "User is not a member of this chat".to_string(),
            ));
        }

        let chat = self.chats.remove_member(chat_id, member).await?;
        tracing::info!("User '{}' removed from chat '{}'", member, chat_id);

        let event = ChatEvent::UserRemovedFromChat {
            chat_id: chat_id.clone(),
            user_id: member.clone(),
        };
        fanout::to_room(self.message_pusher.as_ref(), chat_id, &event).await;
        Ok(chat)
    }

    /// メンバーがグループから退出（作成者は退出できない）
    pub async fn leave(&self, chat_id: &ChatId, member: &UserId) -> Result<(), ChatActionError> {
        let chat = access::member_chat(self.chats.as_ref(), chat_id, member).await?;
        match chat.creator_id() {
            None => {
                return Err(ChatActionError::Validation(
                    "Only group chats can be left".to_string(),
                ));
            }
            Some(creator_id) if creator_id == member => {
                return Err(ChatActionError::Validation(
                    "The group creator cannot leave the chat".to_string(),
                ));
            }
            Some(_) => {}
        }

        self.chats.remove_member(chat_id, member).await?;
        tracing::info!("User '{}' left chat '{}'", member, chat_id);

        let event = ChatEvent::UserRemovedFromChat {
            chat_id: chat_id.clone(),
            user_id: member.clone(),
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
        domain::{ChatKind, ChatName, ConnectionId, Subscriber, User},
        infrastructure::{
            message_pusher::WebSocketMessagePusher,
            repository::{InMemoryChatRepository, InMemoryUserRepository},
        },
    };
    use chrono::Utc;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Fixture {
        chats: Arc<InMemoryChatRepository>,
        usecase: MembershipUseCase,
        chat_id: ChatId,
        u1: User,
        u2: User,
        u3: User,
        u4: User,
        room_rx: UnboundedReceiver<String>,
    }

    /// r2: u1 が作成したグループ（メンバー u1, u2, u3）。u4 は非メンバー
    async fn fixture() -> Fixture {
        let chats = Arc::new(InMemoryChatRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let mut created = Vec::new();
        for name in ["u1", "u2", "u3", "u4"] {
            created.push(
                users
                    .create_user(name.to_string(), format!("{}@example.com", name))
                    .await
                    .unwrap(),
            );
        }
        let u4 = created.pop().unwrap();
        let u3 = created.pop().unwrap();
        let u2 = created.pop().unwrap();
        let u1 = created.pop().unwrap();
        let chat = chats
            .create_chat(
                ChatKind::Group {
                    name: ChatName::new("r2").unwrap(),
                    creator_id: u1.id.clone(),
                },
                vec![u1.id.clone(), u2.id.clone(), u3.id.clone()],
                Utc::now(),
            )
            .await
            .unwrap();
        let (tx, room_rx) = tokio::sync::mpsc::unbounded_channel();
        pusher
            .attach(
                chat.id.clone(),
                Subscriber::new(ConnectionId::generate(), u2.id.clone(), tx),
            )
            .await;
        Fixture {
            usecase: MembershipUseCase::new(chats.clone(), users, pusher),
            chats,
            chat_id: chat.id,
            u1,
            u2,
            u3,
            u4,
            room_rx,
        }
    }

    async fn members(f: &Fixture) -> Vec<UserId> {
        f.chats.find_chat(&f.chat_id).await.unwrap().unwrap().member_ids
    }

    #[tokio::test]
    async fn test_non_creator_cannot_remove_member() {
        // テスト項目: 作成者以外のメンバー削除は拒否され、メンバーも配信も変わらない
        // given (前提条件):
        let mut f = fixture().await;
        let before = members(&f).await;

        // when (操作):
        let result = f.usecase.remove(&f.chat_id, &f.u2.id, &f.u3.id).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ChatActionError::Forbidden(_))));
        assert_eq!(members(&f).await, before);
        assert!(f.room_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_creator_removes_member() {
        // テスト項目: 作成者はメンバーを削除でき、user_removed_from_chat が配信される
        // given (前提条件):
        let mut f = fixture().await;

        // when (操作):
        let chat = f
            .usecase
            .remove(&f.chat_id, &f.u1.id, &f.u3.id)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!chat.is_member(&f.u3.id));
        let pushed: serde_json::Value =
            serde_json::from_str(&f.room_rx.recv().await.unwrap()).unwrap();
        assert_eq!(
            pushed,
            serde_json::json!({
                "type": "user_removed_from_chat",
                "chatId": f.chat_id.as_str(),
                "userId": f.u3.id.as_str(),
            })
        );
    }

    #[tokio::test]
    async fn test_creator_cannot_be_removed() {
        // テスト項目: 作成者自身は削除できない
        // given (前提条件):
        let f = fixture().await;

        // when (操作):
        let result = f.usecase.remove(&f.chat_id, &f.u1.id, &f.u1.id).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ChatActionError::Validation(_))));
        assert!(members(&f).await.contains(&f.u1.id));
    }

    #[tokio::test]
    async fn test_creator_adds_member() {
        // テスト項目: 作成者はメンバーを追加でき、user_added_to_chat が配信される
        // given (前提条件):
        let mut f = fixture().await;

        // when (操作):
        let chat = f.usecase.add(&f.chat_id, &f.u1.id, &f.u4.id).await.unwrap();
        let again = f.usecase.add(&f.chat_id, &f.u1.id, &f.u4.id).await;

        // then (期待する結果):
        assert!(chat.is_member(&f.u4.id));
        assert!(matches!(again, Err(ChatActionError::Validation(_))));
        let pushed: serde_json::Value =
            serde_json::from_str(&f.room_rx.recv().await.unwrap()).unwrap();
        assert_eq!(pushed["type"], "user_added_to_chat");
        assert_eq!(pushed["userId"], f.u4.id.as_str());
        assert!(f.room_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_non_creator_cannot_add_member() {
        // テスト項目: 作成者以外はメンバーを追加できない
        // given (前提条件):
        let f = fixture().await;

        // when (操作):
        let result = f.usecase.add(&f.chat_id, &f.u3.id, &f.u4.id).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ChatActionError::Forbidden(_))));
        assert!(!members(&f).await.contains(&f.u4.id));
    }

    #[tokio::test]
    async fn test_member_leaves_but_creator_cannot() {
        // テスト項目: メンバーは退出でき、作成者は退出できない
        // given (前提条件):
        let mut f = fixture().await;

        // when (操作):
        let left = f.usecase.leave(&f.chat_id, &f.u3.id).await;
        let creator = f.usecase.leave(&f.chat_id, &f.u1.id).await;

        // then (期待する結果):
        assert_eq!(left, Ok(()));
        assert!(matches!(creator, Err(ChatActionError::Validation(_))));
        assert!(!members(&f).await.contains(&f.u3.id));
        let pushed: serde_json::Value =
            serde_json::from_str(&f.room_rx.recv().await.unwrap()).unwrap();
        assert_eq!(pushed["type"], "user_removed_from_chat");
    }
}
