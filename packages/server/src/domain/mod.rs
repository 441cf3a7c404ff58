//! Domain layer: value objects, entities, events and the traits the use cases depend on.

pub mod connection;
pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use connection::{ConnectionKind, ConnectionPhase};
pub use entity::{
    ChatDetail, ChatKind, ChatRoom, ChatSummary, Message, MessageDetail, NewMessage, Presence,
    ReplyPreview, UnreadCount, User,
};
pub use error::{ConnectionPhaseError, MessagePushError, RepositoryError, ValueObjectError};
pub use event::ChatEvent;
pub use message_pusher::{MessagePusher, PusherChannel, Subscriber};
pub use repository::{ChatRepository, MessageRepository, SessionRepository, UserRepository};
pub use value_object::{
    ChatId, ChatName, ConnectionId, MessageContent, MessageId, SessionToken, UserId,
};
