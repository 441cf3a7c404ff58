//! UseCase: チャット詳細の取得・メッセージ検索

use std::sync::Arc;

use crate::domain::{
    ChatDetail, ChatId, ChatRepository, MessageDetail, MessageRepository, UserId, UserRepository,
};

use super::{access, detail, error::ChatActionError};

pub struct GetChatUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
}

impl GetChatUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            chats,
            messages,
            users,
        }
    }

    /// メンバーと全メッセージ（古い順）を含むチャット詳細
    pub async fn execute(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<ChatDetail, ChatActionError> {
        let chat = access::member_chat(self.chats.as_ref(), chat_id, user_id).await?;
        let members = self.users.find_users(&chat.member_ids).await?;
        let messages = self.messages.find_messages(chat_id).await?;
        let messages =
            detail::expand_all(self.users.as_ref(), self.messages.as_ref(), messages).await?;
        Ok(ChatDetail {
            chat,
            members,
            messages,
        })
    }

    /// 本文の部分一致検索（大文字小文字を区別しない）
    pub async fn search(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
        query: &str,
    ) -> Result<Vec<MessageDetail>, ChatActionError> {
        if query.trim().is_empty() {
            return Err(ChatActionError::Validation(
                "Search query must not be empty".to_string(),
            ));
        }
        access::member_chat(self.chats.as_ref(), chat_id, user_id).await?;
        let found = self.messages.search_messages(chat_id, query).await?;
        Ok(detail::expand_all(self.users.as_ref(), self.messages.as_ref(), found).await?)
    }
}
