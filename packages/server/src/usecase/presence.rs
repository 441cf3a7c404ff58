//! Presence Tracker
//!
//! ユーザーのオンライン状態をストレージに書き込み、`user_status_update` イベントを返します。
//! ルームは知らないため、配信は呼び出し側の責務です。
//!
//! 書き込みに失敗した場合はログに残して `None` を返します（プレゼンスはベストエフォート）。

use std::sync::Arc;

use hanashi_shared::time::Clock;

use crate::domain::{ChatEvent, UserId, UserRepository};

pub struct PresenceTracker {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl PresenceTracker {
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    pub async fn mark_online(&self, user_id: &UserId) -> Option<ChatEvent> {
        self.update(user_id, true).await
    }

    pub async fn mark_offline(&self, user_id: &UserId) -> Option<ChatEvent> {
        self.update(user_id, false).await
    }

    async fn update(&self, user_id: &UserId, is_online: bool) -> Option<ChatEvent> {
        let now = self.clock.now();
        match self.users.update_presence(user_id, is_online, now).await {
            Ok(user) => {
                tracing::info!(
                    "User '{}' is now {}",
                    user.id,
                    if is_online { "online" } else { "offline" }
                );
                Some(ChatEvent::UserStatusUpdate {
                    user_id: user.id,
                    is_online,
                    last_seen_at: user.last_seen_at.unwrap_or(now),
                })
            }
            Err(e) => {
                tracing::warn!("Failed to update presence of '{}': {}", user_id, e);
                None
            }
        }
    }
}

/// `connections` 回の markOnline の後に同じ回数の markOffline だけを許すトラッカー
///
/// 呼び出し回数はモックの drop 時に検証される。
#[cfg(test)]
pub(crate) fn tracker_expecting_cycles(connections: usize) -> Arc<PresenceTracker> {
    use crate::domain::{RepositoryError, User, repository::MockUserRepository};
    use chrono::{DateTime, Utc};
    use hanashi_shared::time::FixedClock;

    let stored = |id: &UserId, is_online: bool, at: DateTime<Utc>| -> Result<User, RepositoryError> {
        let mut user = User::new(id.clone(), id.to_string(), format!("{}@example.com", id));
        user.is_online = is_online;
        user.last_seen_at = Some(at);
        Ok(user)
    };
    let mut users = MockUserRepository::new();
    let mut seq = mockall::Sequence::new();
    users
        .expect_update_presence()
        .withf(|_, online, _| *online)
        .times(connections)
        .in_sequence(&mut seq)
        .returning(stored);
    users
        .expect_update_presence()
        .withf(|_, online, _| !*online)
        .times(connections)
        .in_sequence(&mut seq)
        .returning(stored);
    Arc::new(PresenceTracker::new(
        Arc::new(users),
        Arc::new(FixedClock::from_millis(0)),
    ))
}
