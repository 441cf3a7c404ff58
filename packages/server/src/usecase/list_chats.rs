//! UseCase: 自分のチャット一覧・未読数

use std::{cmp::Reverse, sync::Arc};

use crate::domain::{
    ChatRepository, ChatSummary, MessageRepository, UnreadCount, UserId, UserRepository,
};

use super::{detail, error::ChatActionError};

pub struct ListChatsUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
}

impl ListChatsUseCase {
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

    /// 未読のあるチャットを先に、その中では最終アクティビティの新しい順に並べる
    pub async fn execute(&self, user_id: &UserId) -> Result<Vec<ChatSummary>, ChatActionError> {
        let chats = self.chats.find_chats_for_user(user_id).await?;
        let mut summaries = Vec::with_capacity(chats.len());
        for chat in chats {
            let members = self.users.find_users(&chat.member_ids).await?;
            let last_message = match self.messages.find_last_message(&chat.id).await? {
                Some(message) => {
                    Some(detail::expand(self.users.as_ref(), self.messages.as_ref(), message).await?)
                }
                None => None,
            };
            let unread_count = self.messages.count_unread(&chat.id, user_id).await?;
            summaries.push(ChatSummary {
                chat,
                members,
                last_message,
                unread_count,
            });
        }

        summaries.sort_by_key(|s| (s.unread_count == 0, Reverse(s.last_activity())));
        Ok(summaries)
    }

    pub async fn unread_counts(&self, user_id: &UserId) -> Result<Vec<UnreadCount>, ChatActionError> {
        let chats = self.chats.find_chats_for_user(user_id).await?;
        let mut counts = Vec::with_capacity(chats.len());
        for chat in chats {
            let unread_count = self.messages.count_unread(&chat.id, user_id).await?;
            counts.push(UnreadCount {
                chat_id: chat.id,
                unread_count,
            });
        }
        Ok(counts)
    }
}
