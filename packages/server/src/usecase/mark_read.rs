//! UseCase: 既読処理（1 件・チャット内の全件）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - MarkReadUseCase::mark_one() / mark_all() メソッド
//! - `message_read` / `all_messages_read` のルーム配信と `unread_update`
//!
//! ### どのような状況を想定しているか
//! - 正常系：受信者による既読、チャット内の一括既読
//! - エッジケース：送信者自身の既読は何もしない（配信なし）
//! - 異常系：メンバーでないチャットのメッセージ

use std::sync::Arc;

use hanashi_shared::time::Clock;

use crate::domain::{
    ChatEvent, ChatId, ChatRepository, MessageDetail, MessageId, MessagePusher,
    MessageRepository, UserId, UserRepository,
};

use super::{access, detail, error::ChatActionError, fanout};

pub struct MarkReadUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl MarkReadUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chats,
            messages,
            users,
            message_pusher,
            clock,
        }
    }

    /// メッセージ 1 件を既読にする
    ///
    /// 送信者自身が呼んだ場合は変更せずにそのまま返す。
    pub async fn mark_one(
        &self,
        message_id: &MessageId,
        reader: &UserId,
    ) -> Result<MessageDetail, ChatActionError> {
        let not_found = || ChatActionError::NotFound("Message not found".to_string());
        let message = self
            .messages
            .find_message(message_id)
            .await?
            .ok_or_else(not_found)?;
        let chat = self
            .chats
            .find_chat(&message.chat_id)
            .await?
            .ok_or_else(not_found)?;
        if !chat.is_member(reader) {
            return Err(not_found());
        }

        if &message.sender_id == reader {
            return Ok(detail::expand(self.users.as_ref(), self.messages.as_ref(), message).await?);
        }

        let updated = self.messages.mark_read(message_id, self.clock.now()).await?;
        let updated = detail::expand(self.users.as_ref(), self.messages.as_ref(), updated).await?;

        let event = ChatEvent::MessageRead {
            message_id: message_id.clone(),
            message: updated.clone(),
        };
        fanout::to_room(self.message_pusher.as_ref(), &chat.id, &event).await;
        fanout::to_unread_feed(self.message_pusher.as_ref()).await;
        Ok(updated)
    }

    /// チャット内の他人の未読メッセージをすべて既読にし、更新したメッセージを返す
    pub async fn mark_all(
        &self,
        chat_id: &ChatId,
        reader: &UserId,
    ) -> Result<Vec<MessageDetail>, ChatActionError> {
        access::member_chat(self.chats.as_ref(), chat_id, reader).await?;

        let updated = self
            .messages
            .mark_all_read(chat_id, reader, self.clock.now())
            .await?;
        tracing::info!(
            "User '{}' read {} message(s) in chat '{}'",
            reader,
            updated.len(),
            chat_id
        );
        let updated = detail::expand_all(self.users.as_ref(), self.messages.as_ref(), updated).await?;

        let event = ChatEvent::AllMessagesRead {
            chat_id: chat_id.clone(),
            user_id: reader.clone(),
            updated_messages: updated.clone(),
        };
        fanout::to_room(self.message_pusher.as_ref(), chat_id, &event).await;
        fanout::to_unread_feed(self.message_pusher.as_ref()).await;
        Ok(updated)
    }
}
