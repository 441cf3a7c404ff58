//! UseCase 層
//!
//! 1 つの操作につき 1 つの構造体。Domain 層の trait（Repository / MessagePusher）にのみ
//! 依存し、具体的な実装は `ui::Server` の構築時に注入されます。
//!
//! 変更を伴う操作は、ストレージの変更が成功した後にだけイベントを配信します。

mod access;
mod detail;
mod fanout;

pub mod connect_room;
pub mod create_chat;
pub mod delete_chat;
pub mod delete_message;
pub mod disconnect_room;
pub mod error;
pub mod get_chat;
pub mod list_chats;
pub mod mark_read;
pub mod membership;
pub mod presence;
pub mod rename_chat;
pub mod send_message;
pub mod typing;
pub mod unread_feed;
pub mod users;

pub use connect_room::ConnectRoomUseCase;
pub use create_chat::CreateChatUseCase;
pub use delete_chat::DeleteChatUseCase;
pub use delete_message::DeleteMessageUseCase;
pub use disconnect_room::DisconnectRoomUseCase;
pub use error::{ChatActionError, ConnectError, SendMessageError};
pub use get_chat::GetChatUseCase;
pub use list_chats::ListChatsUseCase;
pub use mark_read::MarkReadUseCase;
pub use membership::MembershipUseCase;
pub use presence::PresenceTracker;
pub use rename_chat::RenameChatUseCase;
pub use send_message::SendMessageUseCase;
pub use typing::TypingUseCase;
pub use unread_feed::UnreadFeedUseCase;
pub use users::UsersUseCase;
