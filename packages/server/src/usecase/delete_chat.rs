//! UseCase: チャット削除
//!
//! メンバーであれば誰でも削除できます。削除後にルームへ `chat_deleted` を配信しますが、
//! 接続は切断しません（クライアント側でルームの追跡を止める）。

use std::sync::Arc;

use crate::domain::{ChatEvent, ChatId, ChatRepository, MessagePusher, UserId};

use super::{access, error::ChatActionError, fanout};

pub struct DeleteChatUseCase {
    chats: Arc<dyn ChatRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DeleteChatUseCase {
    pub fn new(chats: Arc<dyn ChatRepository>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            chats,
            message_pusher,
        }
    }

    pub async fn execute(&self, chat_id: &ChatId, user_id: &UserId) -> Result<(), ChatActionError> {
        access::member_chat(self.chats.as_ref(), chat_id, user_id).await?;
        self.chats.delete_chat(chat_id).await?;
        tracing::info!("Chat '{}' deleted by '{}'", chat_id, user_id);

        let event = ChatEvent::ChatDeleted {
            chat_id: chat_id.clone(),
        };
        fanout::to_room(self.message_pusher.as_ref(), chat_id, &event).await;
        fanout::to_unread_feed(self.message_pusher.as_ref()).await;
        Ok(())
    }
}
