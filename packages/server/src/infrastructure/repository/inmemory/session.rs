//! InMemory Session Repository 実装
//!
//! セッショントークン → ユーザー ID の対応を保持し、解決時に User Repository から
//! 最新のユーザー情報を読み込みます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, SessionRepository, SessionToken, User, UserId, UserRepository};

pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<SessionToken, UserId>>,
    users: Arc<dyn UserRepository>,
}

impl InMemorySessionRepository {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            users,
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn resolve(&self, token: &SessionToken) -> Result<Option<User>, RepositoryError> {
        let user_id = match self.sessions.lock().await.get(token) {
            Some(user_id) => user_id.clone(),
            None => return Ok(None),
        };
        // lock is released before touching the user store
        self.users.find_user(&user_id).await
    }

    async fn issue(&self, user_id: &UserId) -> Result<SessionToken, RepositoryError> {
        if self.users.find_user(user_id).await?.is_none() {
            return Err(RepositoryError::UserNotFound(user_id.to_string()));
        }
        let token = SessionToken::generate();
        self.sessions
            .lock()
            .await
            .insert(token.clone(), user_id.clone());
        Ok(token)
    }

    async fn revoke(&self, token: &SessionToken) -> Result<(), RepositoryError> {
        self.sessions.lock().await.remove(token);
        Ok(())
    }
}
