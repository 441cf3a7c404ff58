//! 変更後のイベント配信ヘルパー
//!
//! 配信はストレージ変更が成功した後にのみ呼ばれます。配信の失敗はログに残すだけで、
//! 呼び出し元の操作を失敗させません。

use crate::domain::{ChatEvent, ChatId, MessagePusher};

/// ルームの購読者に配信
pub(crate) async fn to_room(pusher: &dyn MessagePusher, chat_id: &ChatId, event: &ChatEvent) {
    match pusher.broadcast(chat_id, event).await {
        Ok(delivered) => tracing::info!(
            "Broadcasted '{}' to {} connection(s) in chat '{}'",
            event.name(),
            delivered,
            chat_id
        ),
        Err(e) => tracing::warn!("Failed to broadcast to chat '{}': {}", chat_id, e),
    }
}

/// 未読フィードに `unread_update` を配信
pub(crate) async fn to_unread_feed(pusher: &dyn MessagePusher) {
    match pusher.broadcast_unread(&ChatEvent::UnreadUpdate).await {
        Ok(delivered) => {
            tracing::debug!("Broadcasted 'unread_update' to {} connection(s)", delivered)
        }
        Err(e) => tracing::warn!("Failed to broadcast unread update: {}", e),
    }
}

/// 全ルーム・未読フィードの購読者に配信（プレゼンス）
pub(crate) async fn to_everyone(pusher: &dyn MessagePusher, event: &ChatEvent) {
    match pusher.broadcast_all(event).await {
        Ok(delivered) => tracing::info!(
            "Broadcasted '{}' to {} connection(s)",
            event.name(),
            delivered
        ),
        Err(e) => tracing::warn!("Failed to broadcast '{}': {}", event.name(), e),
    }
}
