//! UseCase: グループ名の変更（作成者のみ）

use std::sync::Arc;

use crate::domain::{ChatEvent, ChatId, ChatName, ChatRepository, ChatRoom, MessagePusher, UserId};

use super::{access, error::ChatActionError, fanout};

pub struct RenameChatUseCase {
    chats: Arc<dyn ChatRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RenameChatUseCase {
    pub fn new(chats: Arc<dyn ChatRepository>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            chats,
            message_pusher,
        }
    }

    pub async fn execute(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
        name: &str,
    ) -> Result<ChatRoom, ChatActionError> {
        let name = ChatName::new(name)?;
        let chat = access::member_chat(self.chats.as_ref(), chat_id, user_id).await?;
        access::require_group_creator(&chat, user_id, "rename the chat")?;

        let chat = self.chats.rename_chat(chat_id, name.clone()).await?;
        tracing::info!("Chat '{}' renamed to '{}'", chat_id, name);

        let event = ChatEvent::ChatNameUpdated {
            chat_id: chat_id.clone(),
            new_name: name,
        };
        fanout::to_room(self.message_pusher.as_ref(), chat_id, &event).await;
        Ok(chat)
    }
}
