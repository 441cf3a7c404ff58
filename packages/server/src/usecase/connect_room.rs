//! UseCase: ルーム接続（Message Gateway の Connecting → Authorized → Active）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectRoomUseCase::authorize() / execute() メソッド
//! - 接続前のチャット存在・メンバーシップ確認
//! - Connection Registry への登録とプレゼンス配信
//!
//! ### どのような状況を想定しているか
//! - 正常系：メンバーの接続、登録後の online 通知
//! - 異常系：存在しないチャット、非メンバーの接続

use std::sync::Arc;

use crate::domain::{ChatId, ChatRepository, ChatRoom, MessagePusher, Subscriber, UserId};

use super::{error::ConnectError, fanout, presence::PresenceTracker};

/// ルーム接続のユースケース
pub struct ConnectRoomUseCase {
    chats: Arc<dyn ChatRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    presence: Arc<PresenceTracker>,
}

impl ConnectRoomUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        presence: Arc<PresenceTracker>,
    ) -> Self {
        Self {
            chats,
            message_pusher,
            presence,
        }
    }

    /// アップグレード前の認可：チャットが存在し、ユーザーがメンバーであること
    pub async fn authorize(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<ChatRoom, ConnectError> {
        let chat = self
            .chats
            .find_chat(chat_id)
            .await
            .map_err(|e| ConnectError::Storage(e.to_string()))?
            .ok_or_else(|| ConnectError::ChatNotFound(chat_id.to_string()))?;
        if !chat.is_member(user_id) {
            return Err(ConnectError::NotAMember {
                chat_id: chat_id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        Ok(chat)
    }

    /// 接続を Registry に登録し、オンライン状態を全接続に配信
    pub async fn execute(&self, chat_id: ChatId, subscriber: Subscriber) {
        let user_id = subscriber.user_id.clone();
        self.message_pusher.attach(chat_id, subscriber).await;

        if let Some(event) = self.presence.mark_online(&user_id).await {
            fanout::to_everyone(self.message_pusher.as_ref(), &event).await;
        }
    }
}
