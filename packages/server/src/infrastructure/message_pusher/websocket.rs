//! WebSocket を使った MessagePusher 実装（Connection Registry + Room Broadcaster）
//!
//! ## 責務
//!
//! - ルームごとの購読者集合と、未読フィードの購読者集合を管理
//! - イベントを一度だけ JSON にシリアライズし、開いている接続すべてに送信
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//!
//! 閉じた接続は配信時にスキップするだけで、削除はしません。
//! 削除は接続のクローズ時に `detach` / `detach_unread` で行います。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ChatEvent, ChatId, ConnectionId, MessagePushError, MessagePusher, Subscriber},
    infrastructure::dto::websocket::Envelope,
};

#[derive(Default)]
struct Registry {
    /// Key: chat id, Value: 到着順の購読者
    rooms: HashMap<ChatId, Vec<Subscriber>>,
    /// 接続がどのルームに属しているか（1 接続 1 ルーム）
    room_of: HashMap<ConnectionId, ChatId>,
    unread: Vec<Subscriber>,
}

impl Registry {
    fn remove_from_room(&mut self, chat_id: &ChatId, connection_id: &ConnectionId) -> bool {
        let Some(subscribers) = self.rooms.get_mut(chat_id) else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|s| &s.connection_id != connection_id);
        let removed = subscribers.len() != before;
        if subscribers.is_empty() {
            self.rooms.remove(chat_id);
        }
        removed
    }
}

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.attach(chat_id.clone(), Subscriber::new(connection_id, user_id, tx)).await;
/// pusher.broadcast(&chat_id, &ChatEvent::UnreadUpdate).await?;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    registry: Mutex<Registry>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }
}

fn serialize(event: &ChatEvent) -> Result<String, MessagePushError> {
    serde_json::to_string(&Envelope::from(event.clone())).map_err(|e| {
        MessagePushError::Serialization {
            event: event.name(),
            reason: e.to_string(),
        }
    })
}

/// 開いている接続にだけ送信し、送信できた数を返す
fn deliver<'a>(subscribers: impl Iterator<Item = &'a Subscriber>, payload: &str) -> usize {
    let mut delivered = 0;
    for subscriber in subscribers {
        if !subscriber.is_open() {
            tracing::debug!(
                "Skipping closed connection '{}' of user '{}'",
                subscriber.connection_id,
                subscriber.user_id
            );
            continue;
        }
        match subscriber.sender.send(payload.to_string()) {
            Ok(()) => delivered += 1,
            Err(e) => tracing::warn!(
                "Failed to push message to connection '{}': {}",
                subscriber.connection_id,
                e
            ),
        }
    }
    delivered
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn attach(&self, chat_id: ChatId, subscriber: Subscriber) {
        let mut registry = self.registry.lock().await;
        let connection_id = subscriber.connection_id.clone();

        if let Some(previous) = registry.room_of.get(&connection_id).cloned() {
            tracing::warn!(
                "Connection '{}' moved from chat '{}' to '{}'",
                connection_id,
                previous,
                chat_id
            );
            registry.remove_from_room(&previous, &connection_id);
        }

        registry
            .rooms
            .entry(chat_id.clone())
            .or_default()
            .push(subscriber);
        registry.room_of.insert(connection_id.clone(), chat_id.clone());
        tracing::debug!("Connection '{}' attached to chat '{}'", connection_id, chat_id);
    }

    async fn attach_unread(&self, subscriber: Subscriber) {
        let mut registry = self.registry.lock().await;
        tracing::debug!(
            "Connection '{}' attached to unread feed",
            subscriber.connection_id
        );
        registry.unread.push(subscriber);
    }

    async fn detach(&self, chat_id: &ChatId, connection_id: &ConnectionId) {
        let mut registry = self.registry.lock().await;
        if registry.remove_from_room(chat_id, connection_id) {
            registry.room_of.remove(connection_id);
            tracing::debug!("Connection '{}' detached from chat '{}'", connection_id, chat_id);
        }
    }

    async fn detach_unread(&self, connection_id: &ConnectionId) {
        let mut registry = self.registry.lock().await;
        registry
            .unread
            .retain(|subscriber| &subscriber.connection_id != connection_id);
        tracing::debug!("Connection '{}' detached from unread feed", connection_id);
    }

    async fn broadcast(
        &self,
        chat_id: &ChatId,
        event: &ChatEvent,
    ) -> Result<usize, MessagePushError> {
        let payload = serialize(event)?;
        let registry = self.registry.lock().await;
        let delivered = registry
            .rooms
            .get(chat_id)
            .map(|subscribers| deliver(subscribers.iter(), &payload))
            .unwrap_or(0);
        tracing::debug!(
            "Broadcasted '{}' to {} connection(s) in chat '{}'",
            event.name(),
            delivered,
            chat_id
        );
        Ok(delivered)
    }

    async fn broadcast_unread(&self, event: &ChatEvent) -> Result<usize, MessagePushError> {
        let payload = serialize(event)?;
        let registry = self.registry.lock().await;
        let delivered = deliver(registry.unread.iter(), &payload);
        tracing::debug!(
            "Broadcasted '{}' to {} unread feed connection(s)",
            event.name(),
            delivered
        );
        Ok(delivered)
    }

    async fn broadcast_all(&self, event: &ChatEvent) -> Result<usize, MessagePushError> {
        let payload = serialize(event)?;
        let registry = self.registry.lock().await;
        let rooms = registry.rooms.values().flatten();
        let delivered = deliver(rooms.chain(registry.unread.iter()), &payload);
        tracing::debug!("Broadcasted '{}' to {} connection(s)", event.name(), delivered);
        Ok(delivered)
    }
}

#[cfg(test)]
impl WebSocketMessagePusher {
    pub(crate) async fn count_room_subscribers(&self, chat_id: &ChatId) -> usize {
        let registry = self.registry.lock().await;
        registry.rooms.get(chat_id).map(Vec::len).unwrap_or(0)
    }

    pub(crate) async fn count_unread_subscribers(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.unread.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - attach / detach によるルーム購読者集合の管理
    // - broadcast: ルーム単位の配信、閉じた接続のスキップ
    // - broadcast_unread / broadcast_all: フィード単位の配信
    //
    // 【なぜこのテストが必要か】
    // - ファンアウトの宛先を誤ると、他のルームにメッセージが漏れる
    // - detach 後の接続に配信されないことを保証する必要がある
    // ========================================

    fn subscriber(
        connection: &str,
        user: &str,
    ) -> (Subscriber, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Subscriber::new(
                ConnectionId::new(connection.to_string()).unwrap(),
                UserId::new(user.to_string()).unwrap(),
                tx,
            ),
            rx,
        )
    }

    fn chat(id: &str) -> ChatId {
        ChatId::new(id.to_string()).unwrap()
    }

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_connection_in_room() {
        // テスト項目: ルームの全接続（同一ユーザーの複数タブを含む）に配信される
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice_tab1, mut rx1) = subscriber("c1", "u1");
        let (alice_tab2, mut rx2) = subscriber("c2", "u1");
        let (bob, mut rx3) = subscriber("c3", "u2");
        pusher.attach(chat("r1"), alice_tab1).await;
        pusher.attach(chat("r1"), alice_tab2).await;
        pusher.attach(chat("r1"), bob).await;

        // when (操作):
        let result = pusher.broadcast(&chat("r1"), &ChatEvent::UnreadUpdate).await;

        // then (期待する結果):
        assert_eq!(result, Ok(3));
        let expected = r#"{"type":"unread_update"}"#.to_string();
        assert_eq!(rx1.recv().await, Some(expected.clone()));
        assert_eq!(rx2.recv().await, Some(expected.clone()));
        assert_eq!(rx3.recv().await, Some(expected));
    }

    #[tokio::test]
    async fn test_broadcast_does_not_leak_to_other_rooms() {
        // テスト項目: 別のルームの接続には配信されない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (in_room, mut rx1) = subscriber("c1", "u1");
        let (other_room, mut rx2) = subscriber("c2", "u1");
        let (unread, mut rx3) = subscriber("c3", "u1");
        pusher.attach(chat("r1"), in_room).await;
        pusher.attach(chat("r2"), other_room).await;
        pusher.attach_unread(unread).await;

        // when (操作):
        let result = pusher.broadcast(&chat("r1"), &ChatEvent::UnreadUpdate).await;

        // then (期待する結果):
        assert_eq!(result, Ok(1));
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
        assert!(rx3.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_detached_connection_receives_nothing() {
        // テスト項目: detach 後の接続には配信されない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice, mut rx1) = subscriber("c1", "u1");
        let (bob, mut rx2) = subscriber("c2", "u2");
        pusher.attach(chat("r1"), alice).await;
        pusher.attach(chat("r1"), bob).await;

        // when (操作):
        pusher.detach(&chat("r1"), &connection("c1")).await;
        let result = pusher.broadcast(&chat("r1"), &ChatEvent::UnreadUpdate).await;

        // then (期待する結果):
        assert_eq!(result, Ok(1));
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_empty_room_set_is_removed() {
        // テスト項目: 最後の接続が detach されるとルームのエントリが破棄される
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice, _rx) = subscriber("c1", "u1");
        pusher.attach(chat("r1"), alice).await;

        // when (操作):
        pusher.detach(&chat("r1"), &connection("c1")).await;

        // then (期待する結果):
        assert_eq!(pusher.count_room_subscribers(&chat("r1")).await, 0);
        let registry = pusher.registry.lock().await;
        assert!(registry.rooms.is_empty());
        assert!(registry.room_of.is_empty());
    }

    #[tokio::test]
    async fn test_detach_from_wrong_room_is_noop() {
        // テスト項目: 登録していないルームからの detach は何もしない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice, _rx) = subscriber("c1", "u1");
        pusher.attach(chat("r1"), alice).await;

        // when (操作):
        pusher.detach(&chat("r2"), &connection("c1")).await;

        // then (期待する結果):
        assert_eq!(pusher.count_room_subscribers(&chat("r1")).await, 1);
    }

    #[tokio::test]
    async fn test_connection_is_in_at_most_one_room() {
        // テスト項目: 同じ接続を別ルームに attach すると元のルームから外れる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (first, mut rx) = subscriber("c1", "u1");
        let second = first.clone();
        pusher.attach(chat("r1"), first).await;

        // when (操作):
        pusher.attach(chat("r2"), second).await;

        // then (期待する結果):
        assert_eq!(pusher.count_room_subscribers(&chat("r1")).await, 0);
        assert_eq!(pusher.count_room_subscribers(&chat("r2")).await, 1);
        let result = pusher.broadcast(&chat("r1"), &ChatEvent::UnreadUpdate).await;
        assert_eq!(result, Ok(0));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_connections_are_skipped_but_kept() {
        // テスト項目: 閉じた接続は配信時にスキップされるが、集合からは削除されない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice, rx1) = subscriber("c1", "u1");
        let (bob, mut rx2) = subscriber("c2", "u2");
        pusher.attach(chat("r1"), alice).await;
        pusher.attach(chat("r1"), bob).await;
        drop(rx1);

        // when (操作):
        let result = pusher.broadcast(&chat("r1"), &ChatEvent::UnreadUpdate).await;

        // then (期待する結果):
        assert_eq!(result, Ok(1));
        assert!(rx2.try_recv().is_ok());
        assert_eq!(pusher.count_room_subscribers(&chat("r1")).await, 2);
    }

    #[tokio::test]
    async fn test_broadcast_unread_reaches_only_unread_feed() {
        // テスト項目: broadcast_unread は未読フィードの接続にのみ配信される
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (room, mut rx1) = subscriber("c1", "u1");
        let (unread1, mut rx2) = subscriber("c2", "u1");
        let (unread2, mut rx3) = subscriber("c3", "u2");
        pusher.attach(chat("r1"), room).await;
        pusher.attach_unread(unread1).await;
        pusher.attach_unread(unread2).await;

        // when (操作):
        let result = pusher.broadcast_unread(&ChatEvent::UnreadUpdate).await;

        // then (期待する結果):
        assert_eq!(result, Ok(2));
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
        assert!(rx3.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_detach_unread() {
        // テスト項目: detach_unread 後は未読フィードに配信されない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (unread, mut rx) = subscriber("c1", "u1");
        pusher.attach_unread(unread).await;

        // when (操作):
        pusher.detach_unread(&connection("c1")).await;
        let result = pusher.broadcast_unread(&ChatEvent::UnreadUpdate).await;

        // then (期待する結果):
        assert_eq!(result, Ok(0));
        assert_eq!(pusher.count_unread_subscribers().await, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_all_reaches_rooms_and_unread_feed() {
        // テスト項目: broadcast_all は全ルームと未読フィードの全接続に配信される
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (r1, mut rx1) = subscriber("c1", "u1");
        let (r2, mut rx2) = subscriber("c2", "u2");
        let (unread, mut rx3) = subscriber("c3", "u3");
        pusher.attach(chat("r1"), r1).await;
        pusher.attach(chat("r2"), r2).await;
        pusher.attach_unread(unread).await;

        // when (操作):
        let result = pusher.broadcast_all(&ChatEvent::UnreadUpdate).await;

        // then (期待する結果):
        assert_eq!(result, Ok(3));
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
        assert!(rx3.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_to_unknown_room_delivers_nothing() {
        // テスト項目: 購読者のいないルームへの配信はエラーにならない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.broadcast(&chat("nobody"), &ChatEvent::UnreadUpdate).await;

        // then (期待する結果):
        assert_eq!(result, Ok(0));
    }
}
