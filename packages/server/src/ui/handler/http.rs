//! HTTP API endpoint handlers.
//!
//! Every handler resolves the caller through [`AuthUser`]; mutations broadcast their
//! events from inside the use cases.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    domain::{ChatId, ChatRoom, MessageId, UserId, ValueObjectError},
    infrastructure::dto::{
        http::{
            AddMemberRequest, ChatDetailDto, ChatDto, ChatSummaryDto, CreateChatRequest,
            OnlineStatusRequest, RenameChatRequest, SearchQuery, StatusMessageDto, UnreadCountDto,
        },
        websocket::{MessageDto, UserDto},
    },
    ui::{auth::AuthUser, error::ApiError, state::AppState},
};
use hanashi_shared::time::{Clock, to_rfc3339_millis};

type ApiResult<T> = Result<Json<T>, ApiError>;

fn parse_id<T>(raw: String) -> Result<T, ApiError>
where
    T: TryFrom<String, Error = ValueObjectError>,
{
    Ok(T::try_from(raw)?)
}

async fn chat_dto(state: &AppState, chat: ChatRoom) -> Result<ChatDto, ApiError> {
    let members = state.users_usecase.members(&chat).await?;
    Ok(ChatDto::new(chat, &members))
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "time": to_rfc3339_millis(&state.clock.now()),
    }))
}

/// `GET /api/chat/user`
pub async fn list_my_chats(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<ChatSummaryDto>> {
    let summaries = state.list_chats_usecase.execute(&user.id).await?;
    Ok(Json(summaries.into_iter().map(ChatSummaryDto::from).collect()))
}

/// `GET /api/chat/{id}`
pub async fn get_chat(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> ApiResult<ChatDetailDto> {
    let chat_id: ChatId = parse_id(chat_id)?;
    let detail = state.get_chat_usecase.execute(&chat_id, &user.id).await?;
    Ok(Json(detail.into()))
}

/// `GET /api/chat/{id}/messages/search?q=`
pub async fn search_messages(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<MessageDto>> {
    let chat_id: ChatId = parse_id(chat_id)?;
    let found = state
        .get_chat_usecase
        .search(&chat_id, &user.id, &query.q)
        .await?;
    Ok(Json(found.into_iter().map(MessageDto::from).collect()))
}

/// `POST /api/chat/create`
pub async fn create_chat(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateChatRequest>,
) -> ApiResult<ChatDto> {
    let user_ids = request
        .user_ids
        .into_iter()
        .map(parse_id::<UserId>)
        .collect::<Result<Vec<_>, _>>()?;
    let chat = state
        .create_chat_usecase
        .execute(&user.id, user_ids, request.name)
        .await?;
    Ok(Json(chat_dto(&state, chat).await?))
}

/// `DELETE /api/chat/{id}`
pub async fn delete_chat(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> ApiResult<StatusMessageDto> {
    let chat_id: ChatId = parse_id(chat_id)?;
    state.delete_chat_usecase.execute(&chat_id, &user.id).await?;
    Ok(Json(StatusMessageDto::new("Chat deleted")))
}

/// `POST /api/chat/{id}/leave`
pub async fn leave_chat(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> ApiResult<StatusMessageDto> {
    let chat_id: ChatId = parse_id(chat_id)?;
    state.membership_usecase.leave(&chat_id, &user.id).await?;
    Ok(Json(StatusMessageDto::new("Left the chat")))
}

/// `PUT /api/chat/{id}/name`
pub async fn rename_chat(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Json(request): Json<RenameChatRequest>,
) -> ApiResult<ChatDto> {
    let chat_id: ChatId = parse_id(chat_id)?;
    let chat = state
        .rename_chat_usecase
        .execute(&chat_id, &user.id, &request.name)
        .await?;
    Ok(Json(chat_dto(&state, chat).await?))
}

/// `POST /api/chat/{id}/users`
pub async fn add_member(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Json(request): Json<AddMemberRequest>,
) -> ApiResult<ChatDto> {
    let chat_id: ChatId = parse_id(chat_id)?;
    let new_member: UserId = parse_id(request.user_id)?;
    let chat = state
        .membership_usecase
        .add(&chat_id, &user.id, &new_member)
        .await?;
    Ok(Json(chat_dto(&state, chat).await?))
}

/// `DELETE /api/chat/{id}/users/{user_id}`
pub async fn remove_member(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Path((chat_id, member)): Path<(String, String)>,
) -> ApiResult<ChatDto> {
    let chat_id: ChatId = parse_id(chat_id)?;
    let member: UserId = parse_id(member)?;
    let chat = state
        .membership_usecase
        .remove(&chat_id, &user.id, &member)
        .await?;
    Ok(Json(chat_dto(&state, chat).await?))
}

/// `DELETE /api/chat/{id}/message/{message_id}`
pub async fn delete_message(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Path((chat_id, message_id)): Path<(String, String)>,
) -> ApiResult<StatusMessageDto> {
    let chat_id: ChatId = parse_id(chat_id)?;
    let message_id: MessageId = parse_id(message_id)?;
    state
        .delete_message_usecase
        .execute(&chat_id, &message_id, &user.id)
        .await?;
    Ok(Json(StatusMessageDto::new("Message deleted")))
}

/// `PUT /api/chat/message/{id}/read`
pub async fn mark_message_read(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<String>,
) -> ApiResult<MessageDto> {
    let message_id: MessageId = parse_id(message_id)?;
    let message = state.mark_read_usecase.mark_one(&message_id, &user.id).await?;
    Ok(Json(message.into()))
}

/// `PUT /api/chat/{id}/read-all`
pub async fn mark_all_read(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> ApiResult<Vec<MessageDto>> {
    let chat_id: ChatId = parse_id(chat_id)?;
    let updated = state.mark_read_usecase.mark_all(&chat_id, &user.id).await?;
    Ok(Json(updated.into_iter().map(MessageDto::from).collect()))
}

/// `GET /api/chat/unread/count`
pub async fn unread_counts(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<UnreadCountDto>> {
    let counts = state.list_chats_usecase.unread_counts(&user.id).await?;
    Ok(Json(counts.into_iter().map(UnreadCountDto::from).collect()))
}

/// `GET /api/users/search?q=`
pub async fn search_users(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<UserDto>> {
    let found = state.users_usecase.search(&user.id, &query.q).await?;
    Ok(Json(found.iter().map(UserDto::from).collect()))
}

/// `GET /api/users/online`
pub async fn online_users(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<UserDto>> {
    let online = state.users_usecase.online(&user.id).await?;
    Ok(Json(online.iter().map(UserDto::from).collect()))
}

/// `GET /api/users/{user_id}`
pub async fn get_user(
    AuthUser(_): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<UserDto> {
    let user_id: UserId = parse_id(user_id)?;
    let found = state.users_usecase.get(&user_id).await?;
    Ok(Json(UserDto::from(&found)))
}

/// `PUT /api/users/online-status`
pub async fn set_online_status(
    AuthUser(user): AuthUser,
    State(state): State<Arc<AppState>>,
    Json(request): Json<OnlineStatusRequest>,
) -> ApiResult<UserDto> {
    let updated = state
        .users_usecase
        .set_online_status(&user.id, request.is_online)
        .await?;
    Ok(Json(UserDto::from(&updated)))
}
