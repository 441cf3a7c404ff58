//! Data Transfer Objects (DTOs) for the chat application.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frame and envelope DTOs
//! - `http`: HTTP API request/response DTOs
//! - `conversion`: domain → DTO conversions

pub mod conversion;
pub mod http;
pub mod websocket;
