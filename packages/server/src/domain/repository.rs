//! Repository trait 定義
//!
//! ドメイン層が必要とするストレージ（ユーザー・チャット・メッセージ・セッション）への
//! インターフェースを定義します。具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    ChatId, ChatKind, ChatName, ChatRoom, Message, MessageId, NewMessage, RepositoryError,
    SessionToken, User, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを登録（email は一意）
    async fn create_user(&self, name: String, email: String) -> Result<User, RepositoryError>;

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// 指定された ID のうち存在するユーザーを返す（順序は `ids` に従う）
    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError>;

    /// 名前またはメールアドレスの部分一致（大文字小文字を区別しない）
    async fn search_users(
        &self,
        query: &str,
        exclude: &UserId,
        limit: usize,
    ) -> Result<Vec<User>, RepositoryError>;

    async fn find_online_users(&self, exclude: &UserId) -> Result<Vec<User>, RepositoryError>;

    /// isOnline / lastSeenAt を更新
    async fn update_presence(
        &self,
        id: &UserId,
        is_online: bool,
        at: DateTime<Utc>,
    ) -> Result<User, RepositoryError>;
}

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn create_chat(
        &self,
        kind: ChatKind,
        member_ids: Vec<UserId>,
        created_at: DateTime<Utc>,
    ) -> Result<ChatRoom, RepositoryError>;

    async fn find_chat(&self, id: &ChatId) -> Result<Option<ChatRoom>, RepositoryError>;

    /// ユーザーが参加している全てのチャット
    async fn find_chats_for_user(&self, user_id: &UserId) -> Result<Vec<ChatRoom>, RepositoryError>;

    /// 2 人の間の既存の Private チャット
    async fn find_private_chat(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<ChatRoom>, RepositoryError>;

    async fn rename_chat(&self, id: &ChatId, name: ChatName) -> Result<ChatRoom, RepositoryError>;

    async fn add_member(&self, id: &ChatId, user_id: &UserId) -> Result<ChatRoom, RepositoryError>;

    async fn remove_member(
        &self,
        id: &ChatId,
        user_id: &UserId,
    ) -> Result<ChatRoom, RepositoryError>;

    /// チャットを削除（メッセージも削除される）
    async fn delete_chat(&self, id: &ChatId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create_message(&self, new_message: NewMessage) -> Result<Message, RepositoryError>;

    async fn find_message(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError>;

    /// 指定チャットに属するメッセージのみを返す（返信先の検証用）
    async fn find_message_in_chat(
        &self,
        id: &MessageId,
        chat_id: &ChatId,
    ) -> Result<Option<Message>, RepositoryError>;

    /// チャットの全メッセージ（作成日時の昇順）
    async fn find_messages(&self, chat_id: &ChatId) -> Result<Vec<Message>, RepositoryError>;

    async fn find_last_message(&self, chat_id: &ChatId) -> Result<Option<Message>, RepositoryError>;

    /// `reader` 以外が送信した未読メッセージの件数
    async fn count_unread(&self, chat_id: &ChatId, reader: &UserId)
    -> Result<usize, RepositoryError>;

    async fn mark_read(&self, id: &MessageId, at: DateTime<Utc>) -> Result<Message, RepositoryError>;

    /// `reader` 以外が送信した未読メッセージを一括で既読にし、更新したメッセージを返す
    async fn mark_all_read(
        &self,
        chat_id: &ChatId,
        reader: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Vec<Message>, RepositoryError>;

    async fn delete_message(&self, id: &MessageId) -> Result<(), RepositoryError>;

    /// 本文の部分一致検索（大文字小文字を区別しない、作成日時の昇順）
    async fn search_messages(
        &self,
        chat_id: &ChatId,
        query: &str,
    ) -> Result<Vec<Message>, RepositoryError>;
}

/// Session collaborator: maps an opaque token to an authenticated user
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn resolve(&self, token: &SessionToken) -> Result<Option<User>, RepositoryError>;

    async fn issue(&self, user_id: &UserId) -> Result<SessionToken, RepositoryError>;

    async fn revoke(&self, token: &SessionToken) -> Result<(), RepositoryError>;
}
