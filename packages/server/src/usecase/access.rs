//! チャットへのアクセス権チェック

use crate::domain::{ChatId, ChatRepository, ChatRoom, UserId};

use super::error::ChatActionError;

/// チャットを取得し、`user_id` がメンバーであることを確認する
pub(crate) async fn member_chat(
    chats: &dyn ChatRepository,
    chat_id: &ChatId,
    user_id: &UserId,
) -> Result<ChatRoom, ChatActionError> {
    let chat = chats
        .find_chat(chat_id)
        .await?
        .ok_or_else(|| ChatActionError::NotFound("Chat not found".to_string()))?;
    if !chat.is_member(user_id) {
        return Err(ChatActionError::Forbidden(
            "You are not a member of this chat".to_string(),
        ));
    }
    Ok(chat)
}

/// グループチャットであり、`user_id` が作成者であることを確認する
pub(crate) fn require_group_creator(
    chat: &ChatRoom,
    user_id: &UserId,
    action: &str,
) -> Result<(), ChatActionError> {
    match chat.creator_id() {
        None => Err(ChatActionError::Validation(format!(
            "Only group chats support: {}",
            action
        ))),
        Some(creator_id) if creator_id != user_id => Err(ChatActionError::Forbidden(format!(
            "Only the group creator can {}",
            action
        ))),
        Some(_) => Ok(()),
    }
}
