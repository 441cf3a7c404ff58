//! InMemory Chat / Message Repository 実装
//!
//! チャットとメッセージは同じストアで管理します。チャット削除時にメッセージも削除されます。
//!
//! ストレージ上のチャットは「名前（nullable）+ 作成者（nullable）」で表現し、
//! 読み込み直後に `ChatKind` に変換します。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{
    ChatId, ChatKind, ChatName, ChatRepository, ChatRoom, Message, MessageId, MessageRepository,
    NewMessage, RepositoryError, UserId,
};

/// ストレージ上のチャット行
#[derive(Debug, Clone)]
struct ChatRecord {
    id: ChatId,
    name: Option<String>,
    created_by: Option<UserId>,
    member_ids: Vec<UserId>,
    created_at: DateTime<Utc>,
}

impl ChatRecord {
    fn to_entity(&self) -> Result<ChatRoom, RepositoryError> {
        Ok(ChatRoom {
            id: self.id.clone(),
            kind: ChatKind::from_storage(self.name.clone(), self.created_by.clone())?,
            member_ids: self.member_ids.clone(),
            created_at: self.created_at,
        })
    }

    fn has_member(&self, user_id: &UserId) -> bool {
        self.member_ids.iter().any(|id| id == user_id)
    }
}

#[derive(Default)]
struct ChatStore {
    chats: Vec<ChatRecord>,
    /// 作成順
    messages: Vec<Message>,
}

impl ChatStore {
    fn chat_mut(&mut self, id: &ChatId) -> Result<&mut ChatRecord, RepositoryError> {
        self.chats
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| RepositoryError::ChatNotFound(id.to_string()))
    }

    fn message_mut(&mut self, id: &MessageId) -> Result<&mut Message, RepositoryError> {
        self.messages
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| RepositoryError::MessageNotFound(id.to_string()))
    }

    fn messages_of<'a>(&'a self, chat_id: &'a ChatId) -> impl Iterator<Item = &'a Message> {
        self.messages.iter().filter(move |m| &m.chat_id == chat_id)
    }
}

/// インメモリ Chat / Message Repository 実装
#[derive(Default)]
pub struct InMemoryChatRepository {
    store: Mutex<ChatStore>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn create_chat(
        &self,
        kind: ChatKind,
        member_ids: Vec<UserId>,
        created_at: DateTime<Utc>,
    ) -> Result<ChatRoom, RepositoryError> {
        let (name, created_by) = kind.into_storage();
        let mut unique_members: Vec<UserId> = Vec::with_capacity(member_ids.len());
        for id in member_ids {
            if !unique_members.contains(&id) {
                unique_members.push(id);
            }
        }
        let record = ChatRecord {
            id: ChatId::generate(),
            name,
            created_by,
            member_ids: unique_members,
            created_at,
        };
        let chat = record.to_entity()?;
        self.store.lock().await.chats.push(record);
        Ok(chat)
    }

    async fn find_chat(&self, id: &ChatId) -> Result<Option<ChatRoom>, RepositoryError> {
        let store = self.store.lock().await;
        store
            .chats
            .iter()
            .find(|c| &c.id == id)
            .map(ChatRecord::to_entity)
            .transpose()
    }

    async fn find_chats_for_user(&self, user_id: &UserId) -> Result<Vec<ChatRoom>, RepositoryError> {
        let store = self.store.lock().await;
        store
            .chats
            .iter()
            .filter(|c| c.has_member(user_id))
            .map(ChatRecord::to_entity)
            .collect()
    }

    async fn find_private_chat(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<ChatRoom>, RepositoryError> {
        let store = self.store.lock().await;
        store
            .chats
            .iter()
            .find(|c| {
                c.name.is_none() && c.member_ids.len() == 2 && c.has_member(a) && c.has_member(b)
            })
            .map(ChatRecord::to_entity)
            .transpose()
    }

    async fn rename_chat(&self, id: &ChatId, name: ChatName) -> Result<ChatRoom, RepositoryError> {
        let mut store = self.store.lock().await;
        let record = store.chat_mut(id)?;
        record.name = Some(name.into_string());
        record.to_entity()
    }

    async fn add_member(&self, id: &ChatId, user_id: &UserId) -> Result<ChatRoom, RepositoryError> {
        let mut store = self.store.lock().await;
        let record = store.chat_mut(id)?;
        if record.has_member(user_id) {
            return Err(RepositoryError::AlreadyMember {
                chat_id: id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        record.member_ids.push(user_id.clone());
        record.to_entity()
    }

    async fn remove_member(
        &self,
        id: &ChatId,
        user_id: &UserId,
    ) -> Result<ChatRoom, RepositoryError> {
        let mut store = self.store.lock().await;
        let record = store.chat_mut(id)?;
        if !record.has_member(user_id) {
            return Err(RepositoryError::NotAMember {
                chat_id: id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        record.member_ids.retain(|member| member != user_id);
        record.to_entity()
    }

    async fn delete_chat(&self, id: &ChatId) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        let before = store.chats.len();
        store.chats.retain(|c| &c.id != id);
        if store.chats.len() == before {
            return Err(RepositoryError::ChatNotFound(id.to_string()));
        }
        store.messages.retain(|m| &m.chat_id != id);
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for InMemoryChatRepository {
    async fn create_message(&self, new_message: NewMessage) -> Result<Message, RepositoryError> {
        let mut store = self.store.lock().await;
        if !store.chats.iter().any(|c| c.id == new_message.chat_id) {
            return Err(RepositoryError::ChatNotFound(new_message.chat_id.to_string()));
        }
        let message = Message {
            id: MessageId::generate(),
            chat_id: new_message.chat_id,
            sender_id: new_message.sender_id,
            content: new_message.content,
            reply_to_id: new_message.reply_to_id,
            is_read: false,
            read_at: None,
            created_at: new_message.created_at,
        };
        store.messages.push(message.clone());
        Ok(message)
    }

    async fn find_message(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.messages.iter().find(|m| &m.id == id).cloned())
    }

    async fn find_message_in_chat(
        &self,
        id: &MessageId,
        chat_id: &ChatId,
    ) -> Result<Option<Message>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.messages_of(chat_id).find(|m| &m.id == id).cloned())
    }

    async fn find_messages(&self, chat_id: &ChatId) -> Result<Vec<Message>, RepositoryError> {
        let store = self.store.lock().await;
        let mut messages: Vec<Message> = store.messages_of(chat_id).cloned().collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn find_last_message(&self, chat_id: &ChatId) -> Result<Option<Message>, RepositoryError> {
        let store = self.store.lock().await;
        // max_by_key returns the last maximum, so ties resolve to the newest insert
        Ok(store.messages_of(chat_id).max_by_key(|m| m.created_at).cloned())
    }

    async fn count_unread(
        &self,
        chat_id: &ChatId,
        reader: &UserId,
    ) -> Result<usize, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .messages_of(chat_id)
            .filter(|m| m.is_unread_for(reader))
            .count())
    }

    async fn mark_read(&self, id: &MessageId, at: DateTime<Utc>) -> Result<Message, RepositoryError> {
        let mut store = self.store.lock().await;
        let message = store.message_mut(id)?;
        message.is_read = true;
        message.read_at = Some(at);
        Ok(message.clone())
    }

    async fn mark_all_read(
        &self,
        chat_id: &ChatId,
        reader: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Vec<Message>, RepositoryError> {
        let mut store = self.store.lock().await;
        let mut updated = Vec::new();
        for message in store
            .messages
            .iter_mut()
            .filter(|m| &m.chat_id == chat_id && m.is_unread_for(reader))
        {
            message.is_read = true;
            message.read_at = Some(at);
            updated.push(message.clone());
        }
        Ok(updated)
    }

    async fn delete_message(&self, id: &MessageId) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        let before = store.messages.len();
        store.messages.retain(|m| &m.id != id);
        if store.messages.len() == before {
            return Err(RepositoryError::MessageNotFound(id.to_string()));
        }
        // replies keep their content but lose the link
        for message in store.messages.iter_mut() {
            if message.reply_to_id.as_ref() == Some(id) {
                message.reply_to_id = None;
            }
        }
        Ok(())
    }

    async fn search_messages(
        &self,
        chat_id: &ChatId,
        query: &str,
    ) -> Result<Vec<Message>, RepositoryError> {
        let needle = query.trim().to_lowercase();
        let store = self.store.lock().await;
        let mut found: Vec<Message> = store
            .messages_of(chat_id)
            .filter(|m| m.content.as_str().to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by_key(|m| m.created_at);
        Ok(found)
    }
}
