//! Domain-level error types.

use thiserror::Error;

use super::connection::ConnectionPhase;

/// Validation failures raised while building value objects and entities
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    EmptyId(&'static str),

    #[error("message content must not be empty")]
    EmptyContent,

    #[error("chat name must not be empty")]
    EmptyChatName,

    /// A stored chat has a name but no creator
    #[error("group chat '{0}' has no creator")]
    GroupWithoutCreator(String),
}

/// Errors reported by the storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("chat '{0}' not found")]
    ChatNotFound(String),

    #[error("message '{0}' not found")]
    MessageNotFound(String),

    #[error("user '{user_id}' is already a member of chat '{chat_id}'")]
    AlreadyMember { chat_id: String, user_id: String },

    #[error("user '{user_id}' is not a member of chat '{chat_id}'")]
    NotAMember { chat_id: String, user_id: String },

    #[error("'{0}' is already taken")]
    Conflict(String),

    #[error("corrupt record: {0}")]
    Corrupt(#[from] ValueObjectError),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Errors raised while fanning an event out to live connections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("failed to serialize event '{event}': {reason}")]
    Serialization { event: &'static str, reason: String },
}

/// Illegal connection lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid connection transition: {from:?} -> {to:?}")]
pub struct ConnectionPhaseError {
    pub from: ConnectionPhase,
    pub to: ConnectionPhase,
}
