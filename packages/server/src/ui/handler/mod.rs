//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{
    add_member, create_chat, delete_chat, delete_message, get_chat, get_user, health_check,
    leave_chat, list_my_chats, mark_all_read, mark_message_read, online_users, remove_member,
    rename_chat, search_messages, search_users, set_online_status, unread_counts,
};
pub use websocket::{room_websocket_handler, unread_websocket_handler};
