//! UseCase: ルーム切断（Active → Closed）
//!
//! 接続を Registry から外し、ユーザーをオフラインにします。同じユーザーが別の接続を
//! 保持していてもオフラインにする（接続ごとに markOnline / markOffline が 1 回ずつ）。

use std::sync::Arc;

use crate::domain::{ChatId, ConnectionId, MessagePusher, UserId};

use super::{fanout, presence::PresenceTracker};

/// ルーム切断のユースケース
pub struct DisconnectRoomUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    presence: Arc<PresenceTracker>,
}

impl DisconnectRoomUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, presence: Arc<PresenceTracker>) -> Self {
        Self {
            message_pusher,
            presence,
        }
    }

    pub async fn execute(&self, chat_id: &ChatId, connection_id: &ConnectionId, user_id: &UserId) {
        self.message_pusher.detach(chat_id, connection_id).await;

        if let Some(event) = self.presence.mark_offline(user_id).await {
            fanout::to_everyone(self.message_pusher.as_ref(), &event).await;
        }
    }
}
