//! InMemory Repository 実装
//!
//! ドメイン層が定義する Repository trait の具体的な実装。
//! `tokio::sync::Mutex` で保護したコレクションをインメモリ DB として使用します。
//! プロセスが終了するとデータは失われます。

mod chat;
mod session;
mod user;

pub use chat::InMemoryChatRepository;
pub use session::InMemorySessionRepository;
pub use user::InMemoryUserRepository;
