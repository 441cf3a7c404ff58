//! UseCase: 入力中インジケーター
//!
//! ストレージは変更せず、ルームの接続にだけ配信します。
//! メッセージ送信と同じく、送信者が現在もメンバーであることを毎回確認します。

use std::sync::Arc;

use crate::domain::{ChatEvent, ChatId, ChatRepository, MessagePusher, User, UserId};

use super::{access, error::ChatActionError, fanout};

pub struct TypingUseCase {
    chats: Arc<dyn ChatRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl TypingUseCase {
    pub fn new(chats: Arc<dyn ChatRepository>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            chats,
            message_pusher,
        }
    }

    pub async fn start(&self, chat_id: &ChatId, user: &User) -> Result<(), ChatActionError> {
        access::member_chat(self.chats.as_ref(), chat_id, &user.id).await?;
        let event = ChatEvent::TypingStart {
            user_id: user.id.clone(),
            user_name: user.name.clone(),
        };
        fanout::to_room(self.message_pusher.as_ref(), chat_id, &event).await;
        Ok(())
    }

    pub async fn stop(&self, chat_id: &ChatId, user_id: &UserId) -> Result<(), ChatActionError> {
        access::member_chat(self.chats.as_ref(), chat_id, user_id).await?;
        let event = ChatEvent::TypingStop {
            user_id: user_id.clone(),
        };
        fanout::to_room(self.message_pusher.as_ref(), chat_id, &event).await;
        Ok(())
    }
}
