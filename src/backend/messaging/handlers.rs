//! Messaging HTTP Handlers
//!
//! All routes sit behind `require_auth`.
//!
//! - `GET /api/messages/users` - sidebar: every other user with an `online` flag
//! - `GET /api/messages/{id}` - conversation with one user, oldest first
//! - `POST /api/messages/send/{id}` - send through the realtime gateway
//! - `GET /api/messages/history?since=` - every message of the caller

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::Collaborators;
use crate::backend::auth::users::{list_users_except, PublicUser};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::realtime::RealtimeGateway;
use crate::shared::{Message, UserId};

/// Sidebar entry
#[derive(Debug, Serialize)]
pub struct SidebarUser {
    #[serde(flatten)]
    pub user: PublicUser,
    pub online: bool,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct SendMessageRequest {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HistoryQuery {
    /// RFC 3339 lower bound (inclusive); everything when absent
    pub since: Option<DateTime<Utc>>,
}

/// List the other users for the sidebar
pub async fn get_users_for_sidebar(
    State(pool): State<Option<PgPool>>,
    State(gateway): State<Arc<RealtimeGateway>>,
    AuthUser(auth): AuthUser,
) -> Result<Json<Vec<SidebarUser>>, BackendError> {
    let pool = pool.ok_or_else(|| BackendError::unavailable("Database not configured"))?;

    let users = list_users_except(&pool, auth.user_id.as_uuid()).await?;
    let sidebar = users
        .into_iter()
        .map(|user| SidebarUser {
            online: gateway.is_online(UserId(user.id)),
            user: user.into(),
        })
        .collect();
    Ok(Json(sidebar))
}

/// Conversation between the caller and `{id}`
pub async fn get_messages(
    State(collaborators): State<Collaborators>,
    AuthUser(auth): AuthUser,
    Path(peer): Path<UserId>,
) -> Result<Json<Vec<Message>>, BackendError> {
    let messages = collaborators
        .store
        .fetch_conversation(auth.user_id, peer)
        .await?;
    Ok(Json(messages))
}

/// Send a direct message to `{id}`
///
/// # Errors
///
/// * `400 Bad Request` - empty or oversized text
/// * `404 Not Found` - recipient has no account
pub async fn send_message(
    State(gateway): State<Arc<RealtimeGateway>>,
    AuthUser(auth): AuthUser,
    Path(recipient): Path<UserId>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), BackendError> {
    let text = request.text.unwrap_or_default();
    let message = gateway.send(auth.user_id, recipient, &text).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// The caller's message history
pub async fn get_history(
    State(collaborators): State<Collaborators>,
    AuthUser(auth): AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Message>>, BackendError> {
    let since = query.since.unwrap_or(DateTime::UNIX_EPOCH);
    let messages = collaborators.store.fetch_history(auth.user_id, since).await?;
    Ok(Json(messages))
}
