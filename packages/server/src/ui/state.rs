//! Shared application state.

use std::sync::Arc;

use hanashi_shared::time::Clock;

use crate::{
    domain::{ChatRepository, MessagePusher, MessageRepository, SessionRepository, UserRepository},
    usecase::{
        ConnectRoomUseCase, CreateChatUseCase, DeleteChatUseCase, DeleteMessageUseCase,
        DisconnectRoomUseCase, GetChatUseCase, ListChatsUseCase, MarkReadUseCase,
        MembershipUseCase, PresenceTracker, RenameChatUseCase, SendMessageUseCase,
        TypingUseCase, UnreadFeedUseCase, UsersUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// SessionRepository（セッション解決の抽象化）
    pub sessions: Arc<dyn SessionRepository>,
    pub clock: Arc<dyn Clock>,
    // Message Gateway / Unread Gateway
    pub connect_room_usecase: Arc<ConnectRoomUseCase>,
    pub disconnect_room_usecase: Arc<DisconnectRoomUseCase>,
    pub unread_feed_usecase: Arc<UnreadFeedUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub typing_usecase: Arc<TypingUseCase>,
    // HTTP
    pub delete_message_usecase: Arc<DeleteMessageUseCase>,
    pub mark_read_usecase: Arc<MarkReadUseCase>,
    pub create_chat_usecase: Arc<CreateChatUseCase>,
    pub delete_chat_usecase: Arc<DeleteChatUseCase>,
    pub rename_chat_usecase: Arc<RenameChatUseCase>,
    pub membership_usecase: Arc<MembershipUseCase>,
    pub get_chat_usecase: Arc<GetChatUseCase>,
    pub list_chats_usecase: Arc<ListChatsUseCase>,
    pub users_usecase: Arc<UsersUseCase>,
}

impl AppState {
    /// Wire every use case to the given collaborators
    pub fn new(
        users: Arc<dyn UserRepository>,
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        sessions: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let presence = Arc::new(PresenceTracker::new(users.clone(), clock.clone()));

        Self {
            sessions,
            clock: clock.clone(),
            connect_room_usecase: Arc::new(ConnectRoomUseCase::new(
                chats.clone(),
                message_pusher.clone(),
                presence.clone(),
            )),
            disconnect_room_usecase: Arc::new(DisconnectRoomUseCase::new(
                message_pusher.clone(),
                presence.clone(),
            )),
            unread_feed_usecase: Arc::new(UnreadFeedUseCase::new(
                message_pusher.clone(),
                presence.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                chats.clone(),
                messages.clone(),
                users.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            typing_usecase: Arc::new(TypingUseCase::new(
                chats.clone(),
                message_pusher.clone(),
            )),
            delete_message_usecase: Arc::new(DeleteMessageUseCase::new(
                chats.clone(),
                messages.clone(),
                message_pusher.clone(),
            )),
            mark_read_usecase: Arc::new(MarkReadUseCase::new(
                chats.clone(),
                messages.clone(),
                users.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            create_chat_usecase: Arc::new(CreateChatUseCase::new(
                chats.clone(),
                users.clone(),
                message_pusher.clone(),
                clock,
            )),
            delete_chat_usecase: Arc::new(DeleteChatUseCase::new(
                chats.clone(),
                message_pusher.clone(),
            )),
            rename_chat_usecase: Arc::new(RenameChatUseCase::new(
                chats.clone(),
                message_pusher.clone(),
            )),
            membership_usecase: Arc::new(MembershipUseCase::new(
                chats.clone(),
                users.clone(),
                message_pusher.clone(),
            )),
            get_chat_usecase: Arc::new(GetChatUseCase::new(
                chats.clone(),
                messages.clone(),
                users.clone(),
            )),
            list_chats_usecase: Arc::new(ListChatsUseCase::new(chats, messages, users.clone())),
            users_usecase: Arc::new(UsersUseCase::new(users, presence, message_pusher)),
        }
    }
}
