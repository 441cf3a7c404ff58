//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};

/// ルーム接続（Message Gateway への参加）の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("chat '{0}' not found")]
    ChatNotFound(String),

    #[error("user '{user_id}' is not a member of chat '{chat_id}'")]
    NotAMember { chat_id: String, user_id: String },

    #[error("storage failure: {0}")]
    Storage(String),
}

/// 受信フレーム（メッセージ送信）の処理失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("invalid message: {0}")]
    Validation(#[from] ValueObjectError),

    #[error("chat '{0}' not found")]
    ChatNotFound(String),

    #[error("user '{user_id}' is not a member of chat '{chat_id}'")]
    NotAMember { chat_id: String, user_id: String },

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// HTTP 経由の操作（変更・参照）の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatActionError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Storage(String),
}

impl From<RepositoryError> for ChatActionError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::UserNotFound(_)
            | RepositoryError::ChatNotFound(_)
            | RepositoryError::MessageNotFound(_) => Self::NotFound(error.to_string()),
            RepositoryError::AlreadyMember { .. }
            | RepositoryError::NotAMember { .. }
            | RepositoryError::Conflict(_) => Self::Validation(error.to_string()),
            RepositoryError::Corrupt(_) | RepositoryError::Storage(_) => {
                tracing::error!("Storage failure: {}", error);
                Self::Storage(error.to_string())
            }
        }
    }
}

impl From<ValueObjectError> for ChatActionError {
    fn from(error: ValueObjectError) -> Self {
        Self::Validation(error.to_string())
    }
}
