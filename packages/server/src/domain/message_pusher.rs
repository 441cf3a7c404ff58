//! MessagePusher trait 定義
//!
//! ルームごとの接続集合と未読フィードの接続集合を管理し、イベントを配信するための
//! インターフェース（Connection Registry + Room Broadcaster）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ChatEvent, ChatId, ConnectionId, MessagePushError, UserId};

/// Outbound channel of one connection; the socket's pusher task drains it.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// One live connection as seen by the registry
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub sender: PusherChannel,
}

impl Subscriber {
    pub fn new(connection_id: ConnectionId, user_id: UserId, sender: PusherChannel) -> Self {
        Self {
            connection_id,
            user_id,
            sender,
        }
    }

    /// The receiving half is still alive
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// ルームの購読者集合に接続を追加（集合がなければ作成）
    async fn attach(&self, chat_id: ChatId, subscriber: Subscriber);

    /// 未読フィードの購読者集合に接続を追加
    async fn attach_unread(&self, subscriber: Subscriber);

    /// ルームから接続を削除（空になった集合は破棄）
    async fn detach(&self, chat_id: &ChatId, connection_id: &ConnectionId);

    async fn detach_unread(&self, connection_id: &ConnectionId);

    /// ルームの開いている接続すべてに配信し、配信数を返す
    async fn broadcast(&self, chat_id: &ChatId, event: &ChatEvent)
    -> Result<usize, MessagePushError>;

    /// 未読フィードの開いている接続すべてに配信
    async fn broadcast_unread(&self, event: &ChatEvent) -> Result<usize, MessagePushError>;

    /// 全ルーム・未読フィードの全接続に配信（プレゼンス更新用）
    async fn broadcast_all(&self, event: &ChatEvent) -> Result<usize, MessagePushError>;
}
