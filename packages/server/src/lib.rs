//! Real-time chat server library.
//!
//! Room fan-out, read receipts, typing indicators and presence over WebSocket, with the
//! HTTP API that mutates chats and messages and broadcasts the results.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
