//! Session extractor.
//!
//! The session token is read from, in order:
//! 1. the `x-session-id` header
//! 2. the `session_id` cookie
//! 3. the `session_id` query parameter (browsers cannot set headers on a WebSocket upgrade)

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query},
    http::{HeaderMap, header::COOKIE, request::Parts},
};
use serde::Deserialize;

use crate::domain::{SessionToken, User};

use super::{error::ApiError, state::AppState};

pub const SESSION_HEADER: &str = "x-session-id";
pub const SESSION_COOKIE: &str = "session_id";

/// The caller's user, resolved from the session before the handler runs
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: Option<String>,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(ApiError::Unauthorized)?;
        match state.sessions.resolve(&token).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => {
                tracing::debug!("Unknown session token");
                Err(ApiError::Unauthorized)
            }
            Err(e) => {
                tracing::error!("Failed to resolve session: {}", e);
                Err(ApiError::Unauthorized)
            }
        }
    }
}

fn session_token(parts: &Parts) -> Option<SessionToken> {
    let raw = header_token(&parts.headers)
        .or_else(|| cookie_token(&parts.headers))
        .or_else(|| {
            Query::<SessionQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(query)| query.session_id)
        })?;
    SessionToken::new(raw).ok()
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}
