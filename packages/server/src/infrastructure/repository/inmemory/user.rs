//! InMemory User Repository 実装

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, User, UserId, UserRepository};

/// インメモリ User Repository 実装（登録順を保持）
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_query(user: &User, needle: &str) -> bool {
    user.name.to_lowercase().contains(needle) || user.email.to_lowercase().contains(needle)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, name: String, email: String) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
            return Err(RepositoryError::Conflict(email));
        }
        let user = User::new(UserId::generate(), name, email);
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| users.iter().find(|u| &u.id == id).cloned())
            .collect())
    }

    async fn search_users(
        &self,
        query: &str,
        exclude: &UserId,
        limit: usize,
    ) -> Result<Vec<User>, RepositoryError> {
        let needle = query.trim().to_lowercase();
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .filter(|u| &u.id != exclude && matches_query(u, &needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_online_users(&self, exclude: &UserId) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .filter(|u| u.is_online && &u.id != exclude)
            .cloned()
            .collect())
    }

    async fn update_presence(
        &self,
        id: &UserId,
        is_online: bool,
        at: DateTime<Utc>,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| RepositoryError::UserNotFound(id.to_string()))?;
        user.is_online = is_online;
        user.last_seen_at = Some(at);
        Ok(user.clone())
    }
}
