//! HTTP + WebSocket surface of the chat server.

mod auth;
mod error;
mod handler;
mod server;
mod signal;
pub mod state;

pub use auth::{SESSION_COOKIE, SESSION_HEADER};
pub use server::Server;
pub use state::AppState;
