//! UseCase: チャット作成
//!
//! - 相手が 1 人：Private チャット（既存の Private チャットがあればそれを返す）
//! - 相手が 2 人以上：Group チャット（作成者 = 呼び出したユーザー）
//!
//! ルームにはまだ購読者がいないため、配信は未読フィードへの `unread_update` のみ。

use std::sync::Arc;

use hanashi_shared::time::Clock;

use crate::domain::{
    ChatKind, ChatName, ChatRepository, ChatRoom, MessagePusher, UserId, UserRepository,
};

use super::{error::ChatActionError, fanout};

pub struct CreateChatUseCase {
    chats: Arc<dyn ChatRepository>,
    users: Arc<dyn UserRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl CreateChatUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        users: Arc<dyn UserRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chats,
            users,
            message_pusher,
            clock,
        }
    }

    /// # Arguments
    ///
    /// * `creator` - 呼び出したユーザー（常にメンバーになる）
    /// * `user_ids` - 招待するユーザー
    /// * `name` - グループ名（省略時は `Group chat (N members)`）
    pub async fn execute(
        &self,
        creator: &UserId,
        user_ids: Vec<UserId>,
        name: Option<String>,
    ) -> Result<ChatRoom, ChatActionError> {
        let mut invitees: Vec<UserId> = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if !invitees.contains(&id) {
                invitees.push(id);
            }
        }

        match invitees.as_slice() {
            [] => Err(ChatActionError::Validation(
                "At least one user is required".to_string(),
            )),
            [other] => self.create_private(creator, other).await,
            _ => self.create_group(creator, invitees, name).await,
        }
    }

    async fn create_private(
        &self,
        creator: &UserId,
        other: &UserId,
    ) -> Result<ChatRoom, ChatActionError> {
        if other == creator {
            return Err(ChatActionError::Validation(
                "Cannot start a chat with yourself".to_string(),
            ));
        }
        if self.users.find_user(other).await?.is_none() {
            return Err(ChatActionError::NotFound("User not found".to_string()));
        }
        if let Some(existing) = self.chats.find_private_chat(creator, other).await? {
            return Ok(existing);
        }

        let chat = self
            .chats
            .create_chat(
                ChatKind::Private,
                vec![creator.clone(), other.clone()],
                self.clock.now(),
            )
            .await?;
        tracing::info!("Private chat '{}' created by '{}'", chat.id, creator);
        fanout::to_unread_feed(self.message_pusher.as_ref()).await;
        Ok(chat)
    }

    async fn create_group(
        &self,
        creator: &UserId,
        invitees: Vec<UserId>,
        name: Option<String>,
    ) -> Result<ChatRoom, ChatActionError> {
        let mut member_ids: Vec<UserId> = invitees
            .into_iter()
            .filter(|id| id != creator)
            .collect();
        let found = self.users.find_users(&member_ids).await?;
        if found.len() != member_ids.len() {
            return Err(ChatActionError::NotFound(
                "Some users were not found".to_string(),
            ));
        }
        member_ids.push(creator.clone());

        let name = match name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => ChatName::new(name)?,
            _ => ChatName::new(&format!("Group chat ({} members)", member_ids.len()))?,
        };
        let chat = self
            .chats
            .create_chat(
                ChatKind::Group {
                    name,
                    creator_id: creator.clone(),
                },
                member_ids,
                self.clock.now(),
            )
            .await?;
        tracing::info!(
            "Group chat '{}' created by '{}' with {} member(s)",
            chat.id,
            creator,
            chat.member_ids.len()
        );
        fanout::to_unread_feed(self.message_pusher.as_ref()).await;
        Ok(chat)
    }
}
