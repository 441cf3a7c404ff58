//! Lifecycle of one live connection (room or unread feed).
//!
//! ```text
//! Connecting ──authorize──▶ Authorized ──activate──▶ Active ──close──▶ Closed
//!      └───────────────────────close──────────────────────────────────▲
//! ```
//!
//! `Closed` is terminal. Only `Active` connections process inbound frames.

use std::fmt;

use super::{error::ConnectionPhaseError, value_object::ChatId};

/// Which feed a connection is subscribed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Attached to exactly one chat room for its whole lifetime
    Room(ChatId),
    /// Cross-chat unread-count feed
    Unread,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room(chat_id) => write!(f, "room:{}", chat_id),
            Self::Unread => f.write_str("unread"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Connecting,
    Authorized,
    Active,
    Closed,
}

impl ConnectionPhase {
    /// Session resolved before the socket upgrade
    pub fn authorize(self) -> Result<Self, ConnectionPhaseError> {
        self.transition(Self::Connecting, Self::Authorized)
    }

    /// Registered with the connection registry and marked online
    pub fn activate(self) -> Result<Self, ConnectionPhaseError> {
        self.transition(Self::Authorized, Self::Active)
    }

    /// Any non-terminal phase may close; closing twice is an error.
    pub fn close(self) -> Result<Self, ConnectionPhaseError> {
        match self {
            Self::Closed => Err(ConnectionPhaseError {
                from: self,
                to: Self::Closed,
            }),
            _ => Ok(Self::Closed),
        }
    }

    pub fn accepts_frames(self) -> bool {
        self == Self::Active
    }

    fn transition(self, expected: Self, next: Self) -> Result<Self, ConnectionPhaseError> {
        if self == expected {
            Ok(next)
        } else {
            Err(ConnectionPhaseError {
                from: self,
                to: next,
            })
        }
    }
}
