//! WebSocket connection handlers (Message Gateway / Unread Gateway).
//!
//! Both gateways drive a [`ConnectionPhase`]:
//! the session is resolved before the upgrade (`Connecting → Authorized`), the connection
//! is registered after it (`Authorized → Active`) and deregistered once either half of
//! the socket finishes (`Active → Closed`).

use std::{future::Future, ops::ControlFlow, sync::Arc};

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, Stream, StreamExt},
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    domain::{
        ChatId, ConnectionId, ConnectionKind, ConnectionPhase, ConnectionPhaseError, Subscriber,
        User, UserId,
    },
    infrastructure::dto::websocket::ClientFrame,
    ui::{auth::AuthUser, error::ApiError, state::AppState},
    usecase::{ConnectError, SendMessageError},
};

type Step = fn(ConnectionPhase) -> Result<ConnectionPhase, ConnectionPhaseError>;

/// Apply a lifecycle step and log it; an illegal step leaves the phase unchanged.
fn transition(
    kind: &ConnectionKind,
    user_id: Option<&UserId>,
    from: ConnectionPhase,
    step: Step,
) -> ConnectionPhase {
    let who = user_id.map(UserId::as_str).unwrap_or("anonymous");
    match step(from) {
        Ok(to) => {
            tracing::debug!("[{}] '{}' {:?} -> {:?}", kind, who, from, to);
            to
        }
        Err(e) => {
            tracing::warn!("[{}] '{}' {}", kind, who, e);
            from
        }
    }
}

/// `GET /api/chat/{id}/ws`
pub async fn room_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    auth: Result<AuthUser, ApiError>,
) -> Response {
    let phase = ConnectionPhase::default();
    let chat_id = match ChatId::new(chat_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Invalid chat id in WebSocket request: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    let kind = ConnectionKind::Room(chat_id.clone());

    let Ok(AuthUser(user)) = auth else {
        transition(&kind, None, phase, ConnectionPhase::close);
        return StatusCode::UNAUTHORIZED.into_response();
    };

    if let Err(e) = state
        .connect_room_usecase
        .authorize(&chat_id, &user.id)
        .await
    {
        tracing::warn!("Rejecting WebSocket for '{}': {}", user.id, e);
        transition(&kind, Some(&user.id), phase, ConnectionPhase::close);
        let status = match e {
            ConnectError::ChatNotFound(_) => StatusCode::NOT_FOUND,
            ConnectError::NotAMember { .. } => StatusCode::FORBIDDEN,
            ConnectError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        return status.into_response();
    }
    let phase = transition(&kind, Some(&user.id), phase, ConnectionPhase::authorize);

    ws.on_upgrade(move |socket| handle_room_socket(socket, state, chat_id, user, phase))
}

/// `GET /api/chat/unread/ws`
pub async fn unread_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    auth: Result<AuthUser, ApiError>,
) -> Response {
    let phase = ConnectionPhase::default();
    let Ok(AuthUser(user)) = auth else {
        transition(&ConnectionKind::Unread, None, phase, ConnectionPhase::close);
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let phase = transition(
        &ConnectionKind::Unread,
        Some(&user.id),
        phase,
        ConnectionPhase::authorize,
    );

    ws.on_upgrade(move |socket| handle_unread_socket(socket, state, user, phase))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound flow: events fanned out by the registry (via the rx
/// channel) are written to this client's WebSocket connection.
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Read inbound frames until the stream ends, `on_frame` breaks, or `stop` fires.
///
/// `stop` is only observed between frames: a frame already being handled runs to completion.
async fn read_frames<S, T, F, Fut>(mut frames: S, mut stop: oneshot::Receiver<()>, mut on_frame: F)
where
    S: Stream<Item = T> + Unpin,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = ControlFlow<()>>,
{
    loop {
        let next = tokio::select! {
            _ = &mut stop => break,
            next = frames.next() => next,
        };
        let Some(frame) = next else {
            break;
        };
        if on_frame(frame).await.is_break() {
            break;
        }
    }
}

/// Wait until either half of the socket finishes.
///
/// When the outbound half ends first, the inbound half is asked to stop and awaited, never
/// aborted.
async fn supervise(
    mut recv_task: JoinHandle<()>,
    mut send_task: JoinHandle<()>,
    stop: oneshot::Sender<()>,
) {
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            let _ = stop.send(());
            if let Err(e) = recv_task.await {
                tracing::error!("Receive task failed: {}", e);
            }
        }
    };
}

async fn handle_room_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    chat_id: ChatId,
    user: User,
    phase: ConnectionPhase,
) {
    let kind = ConnectionKind::Room(chat_id.clone());
    let connection_id = ConnectionId::generate();
    let (sender, receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    state
        .connect_room_usecase
        .execute(
            chat_id.clone(),
            Subscriber::new(connection_id.clone(), user.id.clone(), tx),
        )
        .await;
    let phase = transition(&kind, Some(&user.id), phase, ConnectionPhase::activate);
    tracing::info!(
        "User '{}' connected to chat '{}' (connection {})",
        user.id,
        chat_id,
        connection_id
    );

    let recv_state = state.clone();
    let recv_chat_id = chat_id.clone();
    let recv_user = user.clone();
    let (stop_tx, stop_rx) = oneshot::channel();

    // Spawn a task to receive frames from this client
    let recv_task = tokio::spawn(async move {
        read_frames(receiver, stop_rx, |msg| {
            on_room_message(
                recv_state.clone(),
                recv_chat_id.clone(),
                recv_user.clone(),
                phase,
                msg,
            )
        })
        .await;
    });

    // Spawn a task to push fanned-out events to this client
    let send_task = pusher_loop(rx, sender);

    supervise(recv_task, send_task, stop_tx).await;

    state
        .disconnect_room_usecase
        .execute(&chat_id, &connection_id, &user.id)
        .await;
    transition(&kind, Some(&user.id), phase, ConnectionPhase::close);
    tracing::info!(
        "User '{}' disconnected from chat '{}' (connection {})",
        user.id,
        chat_id,
        connection_id
    );
}

async fn on_room_message(
    state: Arc<AppState>,
    chat_id: ChatId,
    user: User,
    phase: ConnectionPhase,
    msg: Result<Message, axum::Error>,
) -> ControlFlow<()> {
    match msg {
        Ok(Message::Text(text)) if phase.accepts_frames() => {
            handle_room_frame(&state, &chat_id, &user, text.as_str()).await;
        }
        Ok(Message::Ping(_)) => {
            tracing::debug!("Received ping");
        }
        Ok(Message::Close(_)) => {
            tracing::info!("User '{}' requested close", user.id);
            return ControlFlow::Break(());
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!("WebSocket error: {}", e);
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

/// Dispatch one inbound frame. Failures are logged and never close the connection.
async fn handle_room_frame(state: &AppState, chat_id: &ChatId, user: &User, text: &str) {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Malformed frame from '{}': {}", user.id, e);
            return;
        }
    };

    match frame {
        ClientFrame::Message {
            content,
            reply_to_id,
        } => match state
            .send_message_usecase
            .execute(chat_id, user, content, reply_to_id)
            .await
        {
            Ok(sent) => tracing::debug!(
                "Message '{}' from '{}' stored in chat '{}'",
                sent.message.id,
                user.id,
                chat_id
            ),
            Err(e @ SendMessageError::Storage(_)) => {
                tracing::error!("Failed to store message from '{}': {}", user.id, e)
            }
            Err(e) => tracing::warn!("Rejected message from '{}': {}", user.id, e),
        },
        ClientFrame::TypingStart => {
            if let Err(e) = state.typing_usecase.start(chat_id, user).await {
                tracing::warn!("Rejected typing_start from '{}': {}", user.id, e);
            }
        }
        ClientFrame::TypingStop => {
            if let Err(e) = state.typing_usecase.stop(chat_id, &user.id).await {
                tracing::warn!("Rejected typing_stop from '{}': {}", user.id, e);
            }
        }
    }
}

async fn handle_unread_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    user: User,
    phase: ConnectionPhase,
) {
    let kind = ConnectionKind::Unread;
    let connection_id = ConnectionId::generate();
    let (sender, receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    state
        .unread_feed_usecase
        .subscribe(Subscriber::new(connection_id.clone(), user.id.clone(), tx))
        .await;
    let phase = transition(&kind, Some(&user.id), phase, ConnectionPhase::activate);
    tracing::info!(
        "User '{}' subscribed to the unread feed (connection {})",
        user.id,
        connection_id
    );

    // Receive-only feed: inbound frames are drained and ignored
    let user_id = user.id.clone();
    let (stop_tx, stop_rx) = oneshot::channel();
    let recv_task = tokio::spawn(async move {
        read_frames(receiver, stop_rx, |msg| {
            let flow = match msg {
                Ok(Message::Close(_)) => ControlFlow::Break(()),
                Ok(_) => {
                    tracing::debug!("Ignoring inbound frame on unread feed of '{}'", user_id);
                    ControlFlow::Continue(())
                }
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    ControlFlow::Break(())
                }
            };
            std::future::ready(flow)
        })
        .await;
    });

    let send_task = pusher_loop(rx, sender);

    supervise(recv_task, send_task, stop_tx).await;

    state
        .unread_feed_usecase
        .unsubscribe(&connection_id, &user.id)
        .await;
    transition(&kind, Some(&user.id), phase, ConnectionPhase::close);
    tracing::info!(
        "User '{}' left the unread feed (connection {})",
        user.id,
        connection_id
    );
}
