//! メッセージの展開（送信者・返信先の付与）

use crate::domain::{
    Message, MessageDetail, MessageRepository, ReplyPreview, RepositoryError, UserRepository,
};

/// 送信者と返信先（存在すれば）を付与した `MessageDetail` を構築する
///
/// 返信先のメッセージや送信者が既に消えている場合は返信なしとして扱う。
pub(crate) async fn expand(
    users: &dyn UserRepository,
    messages: &dyn MessageRepository,
    message: Message,
) -> Result<MessageDetail, RepositoryError> {
    let sender = users
        .find_user(&message.sender_id)
        .await?
        .ok_or_else(|| RepositoryError::UserNotFound(message.sender_id.to_string()))?;

    let reply_to = match &message.reply_to_id {
        Some(reply_to_id) => match messages.find_message(reply_to_id).await? {
            Some(target) => users
                .find_user(&target.sender_id)
                .await?
                .map(|sender| ReplyPreview {
                    message: target,
                    sender,
                }),
            None => None,
        },
        None => None,
    };

    Ok(MessageDetail {
        message,
        sender,
        reply_to,
    })
}

pub(crate) async fn expand_all(
    users: &dyn UserRepository,
    messages: &dyn MessageRepository,
    list: Vec<Message>,
) -> Result<Vec<MessageDetail>, RepositoryError> {
    let mut details = Vec::with_capacity(list.len());
    for message in list {
        details.push(expand(users, messages, message).await?);
    }
    Ok(details)
}
