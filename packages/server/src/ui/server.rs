//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        add_member, create_chat, delete_chat, delete_message, get_chat, get_user, health_check,
        leave_chat, list_my_chats, mark_all_read, mark_message_read, online_users, remove_member,
        rename_chat, room_websocket_handler, search_messages, search_users, set_online_status,
        unread_counts, unread_websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Real-time chat server
///
/// Owns the shared [`AppState`] and exposes the HTTP API plus the two WebSocket gateways.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(AppState::new(users, chats, messages, sessions, pusher, clock));
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Build the router (also used by the integration tests)
    pub fn router(&self) -> Router {
        // static segments (`user`, `unread`, `message`, `create`) take precedence over `{id}`
        Router::new()
            // WebSocket エンドポイント
            .route("/api/chat/{id}/ws", get(room_websocket_handler))
            .route("/api/chat/unread/ws", get(unread_websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/chat/user", get(list_my_chats))
            .route("/api/chat/create", post(create_chat))
            .route("/api/chat/unread/count", get(unread_counts))
            .route("/api/chat/message/{id}/read", put(mark_message_read))
            .route("/api/chat/{id}", get(get_chat).delete(delete_chat))
            .route("/api/chat/{id}/messages/search", get(search_messages))
            .route("/api/chat/{id}/leave", post(leave_chat))
            .route("/api/chat/{id}/name", put(rename_chat))
            .route("/api/chat/{id}/users", post(add_member))
            .route("/api/chat/{id}/users/{user_id}", delete(remove_member))
            .route("/api/chat/{id}/message/{message_id}", delete(delete_message))
            .route("/api/chat/{id}/read-all", put(mark_all_read))
            .route("/api/users/search", get(search_users))
            .route("/api/users/online", get(online_users))
            .route("/api/users/online-status", put(set_online_status))
            .route("/api/users/{user_id}", get(get_user))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the chat server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Room connections: ws://{}/api/chat/{{id}}/ws", bind_addr);
        tracing::info!("Unread feed: ws://{}/api/chat/unread/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
