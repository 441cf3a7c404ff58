//! UseCase: 未読フィード（Unread Gateway）の購読開始・終了
//!
//! ルーム接続と同じくプレゼンスを更新しますが、Registry への登録は未読フィード側です。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, Subscriber, UserId};

use super::{fanout, presence::PresenceTracker};

/// 未読フィード購読のユースケース
pub struct UnreadFeedUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    presence: Arc<PresenceTracker>,
}

impl UnreadFeedUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, presence: Arc<PresenceTracker>) -> Self {
        Self {
            message_pusher,
            presence,
        }
    }

    /// Authorized → Active
    pub async fn subscribe(&self, subscriber: Subscriber) {
        let user_id = subscriber.user_id.clone();
        self.message_pusher.attach_unread(subscriber).await;

        if let Some(event) = self.presence.mark_online(&user_id).await {
            fanout::to_everyone(self.message_pusher.as_ref(), &event).await;
        }
    }

    /// Active → Closed
    pub async fn unsubscribe(&self, connection_id: &ConnectionId, user_id: &UserId) {
        self.message_pusher.detach_unread(connection_id).await;

        if let Some(event) = self.presence.mark_offline(user_id).await {
            fanout::to_everyone(self.message_pusher.as_ref(), &event).await;
        }
    }
}
