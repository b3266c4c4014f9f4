/**
 * WebSocket Upgrade Handler
 *
 * `GET /ws` picks the session credential from the request and hands the
 * upgraded socket to the connection actor. Verification happens in the
 * actor so a bad credential still gets a proper close frame.
 */

use std::sync::Arc;

use axum::{
    extract::{Query, State, WebSocketUpgrade},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;

use crate::backend::auth::sessions::token_from_headers;
use crate::backend::realtime::RealtimeGateway;
use crate::backend::socket::actor;

/// Query parameters for the WebSocket endpoint
#[derive(Debug, Default, Deserialize)]
pub struct WsAuthQuery {
    pub token: Option<String>,
}

/// GET /ws
///
/// The credential comes from `?token=`, the `jwt` cookie or a Bearer header.
/// The upgrade always succeeds; the actor verifies the credential and
/// closes with 4002 if it is invalid.
pub async fn ws_upgrade(
    State(gateway): State<Arc<RealtimeGateway>>,
    Query(query): Query<WsAuthQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let credential = query
        .token
        .filter(|token| !token.is_empty())
        .or_else(|| token_from_headers(&headers))
        .unwrap_or_default();

    ws.on_upgrade(move |socket| actor::run_connection(socket, gateway, credential))
}
