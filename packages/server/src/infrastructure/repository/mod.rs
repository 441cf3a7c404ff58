//! Storage collaborator implementations.

pub mod inmemory;

pub use inmemory::{InMemoryChatRepository, InMemorySessionRepository, InMemoryUserRepository};
