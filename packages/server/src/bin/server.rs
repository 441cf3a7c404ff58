//! Real-time chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hanashi-server
//! cargo run --bin hanashi-server -- --host 0.0.0.0 --port 3000 --seed-demo
//! ```

use std::sync::Arc;

use clap::Parser;
use hanashi_server::{
    domain::{SessionRepository, UserRepository},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryChatRepository, InMemorySessionRepository, InMemoryUserRepository},
    },
    ui::{AppState, Server},
};
use hanashi_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "hanashi-server")]
#[command(about = "Real-time chat server with room fan-out and presence", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,

    /// Create demo users and print a session token for each
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. MessagePusher
    // 3. UseCases (AppState)
    // 4. Server

    // 1. Create Repositories (in-memory database)
    let users = Arc::new(InMemoryUserRepository::new());
    let chats = Arc::new(InMemoryChatRepository::new());
    let sessions = Arc::new(InMemorySessionRepository::new(users.clone()));

    if args.seed_demo {
        if let Err(e) = seed_demo(users.as_ref(), sessions.as_ref()).await {
            tracing::error!("Failed to seed demo data: {}", e);
            std::process::exit(1);
        }
    }

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let state = AppState::new(
        users,
        chats.clone(),
        chats,
        sessions,
        message_pusher,
        Arc::new(SystemClock),
    );

    // 4. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn seed_demo(
    users: &dyn UserRepository,
    sessions: &dyn SessionRepository,
) -> Result<(), Box<dyn std::error::Error>> {
    for name in ["alice", "bob", "charlie"] {
        let user = users
            .create_user(name.to_string(), format!("{}@example.com", name))
            .await?;
        let token = sessions.issue(&user.id).await?;
        tracing::info!(
            "Demo user '{}' (id {}): x-session-id = {}",
            user.name,
            user.id,
            token
        );
    }
    Ok(())
}
