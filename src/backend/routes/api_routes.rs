/**
 * API Route Configuration
 *
 * # Routes
 *
 * ## Public
 * - `GET /api/health` - liveness and environment
 * - `POST /api/auth/signup` - User registration
 * - `POST /api/auth/login` - User login
 * - `POST /api/auth/logout` - Clear the session cookie
 *
 * ## Behind `require_auth`
 * - `GET /api/auth/check` - Current user
 * - `PUT /api/auth/update-profile` - Update name / profile picture
 * - `GET /api/messages/users` - Sidebar users with online flags
 * - `GET /api/messages/history` - Caller's message history
 * - `GET /api/messages/{id}` - Conversation with one user
 * - `POST /api/messages/send/{id}` - Send a direct message
 */

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::backend::auth::{check_auth, login, logout, signup, update_profile};
use crate::backend::messaging::handlers::{get_history, get_messages, get_users_for_sidebar, send_message};
use crate::backend::middleware::require_auth;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Configure API routes
///
/// `app_state` is needed up front to attach the auth middleware.
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/auth/check", get(check_auth))
        .route("/api/auth/update-profile", put(update_profile))
        .route("/api/messages/users", get(get_users_for_sidebar))
        .route("/api/messages/history", get(get_history))
        .route("/api/messages/{id}", get(get_messages))
        .route("/api/messages/send/{id}", post(send_message))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), require_auth));

    router
        .route("/api/health", get(health))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .merge(protected)
}

/// Health check
async fn health(State(config): State<Arc<AppConfig>>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
        "port": config.port,
        "environment": config.environment.as_str(),
    }))
}
