//! UseCase: ユーザー検索・プロフィール・オンライン状態

use std::sync::Arc;

use crate::domain::{ChatRoom, MessagePusher, User, UserId, UserRepository};

use super::{error::ChatActionError, fanout, presence::PresenceTracker};

const MIN_QUERY_CHARS: usize = 2;
const SEARCH_LIMIT: usize = 10;

pub struct UsersUseCase {
    users: Arc<dyn UserRepository>,
    presence: Arc<PresenceTracker>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl UsersUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        presence: Arc<PresenceTracker>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            users,
            presence,
            message_pusher,
        }
    }

    /// 名前・メールアドレスで検索（自分を除く、最大 10 件）
    pub async fn search(&self, caller: &UserId, query: &str) -> Result<Vec<User>, ChatActionError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(ChatActionError::Validation(format!(
                "Search query must contain at least {} characters",
                MIN_QUERY_CHARS
            )));
        }
        Ok(self.users.search_users(query, caller, SEARCH_LIMIT).await?)
    }

    pub async fn get(&self, user_id: &UserId) -> Result<User, ChatActionError> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| ChatActionError::NotFound("User not found".to_string()))
    }

    /// チャットのメンバー（`member_ids` の順）
    pub async fn members(&self, chat: &ChatRoom) -> Result<Vec<User>, ChatActionError> {
        Ok(self.users.find_users(&chat.member_ids).await?)
    }

    pub async fn online(&self, caller: &UserId) -> Result<Vec<User>, ChatActionError> {
        Ok(self.users.find_online_users(caller).await?)
    }

    /// 明示的なオンライン状態の変更。Presence Tracker を通して全接続に配信する
    pub async fn set_online_status(
        &self,
        user_id: &UserId,
        is_online: bool,
    ) -> Result<User, ChatActionError> {
        let event = if is_online {
            self.presence.mark_online(user_id).await
        } else {
            self.presence.mark_offline(user_id).await
        };
        let Some(event) = event else {
            return Err(ChatActionError::Storage(
                "Failed to update online status".to_string(),
            ));
        };
        fanout::to_everyone(self.message_pusher.as_ref(), &event).await;
        self.get(user_id).await
    }
}
