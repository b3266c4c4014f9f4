/**
 * Login and Logout Handlers
 *
 * POST /api/auth/login verifies email and password and issues the session
 * cookie. Unknown emails and wrong passwords get the same
 * "Invalid credentials" answer.
 *
 * POST /api/auth/logout expires the cookie.
 */
use std::sync::Arc;

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Json},
};
use bcrypt::verify;
use sqlx::PgPool;

use crate::backend::auth::handlers::types::{required, LoginRequest, SessionResponse};
use crate::backend::auth::sessions::{clear_session_cookie, session_cookie, JwtVerifier};
use crate::backend::auth::users::get_user_by_email;
use crate::backend::error::BackendError;
use crate::shared::{AppConfig, UserId};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - missing fields or invalid credentials
/// * `503 Service Unavailable` - database not configured
pub async fn login(
    State(pool): State<Option<PgPool>>,
    State(sessions): State<JwtVerifier>,
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, BackendError> {
    let pool = pool.ok_or_else(|| BackendError::unavailable("Database not configured"))?;

    let (Some(email), Some(password)) = (
        required(&request.email),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(BackendError::bad_request("All fields are required"));
    };

    let Some(user) = get_user_by_email(&pool, email).await? else {
        tracing::warn!("[Auth] Login for unknown email");
        return Err(BackendError::bad_request(INVALID_CREDENTIALS));
    };

    let password = password.to_string();
    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify(password, &stored_hash))
        .await
        .map_err(|e| BackendError::state(format!("hashing task failed: {}", e)))??;
    if !valid {
        tracing::warn!(user_id = %user.id, "[Auth] Wrong password");
        return Err(BackendError::bad_request(INVALID_CREDENTIALS));
    }

    let token = sessions.create_token(UserId(user.id))?;
    tracing::info!(user_id = %user.id, "[Auth] User logged in");

    Ok(SessionResponse {
        user: user.into(),
        cookie: session_cookie(&token, config.environment.is_production()),
    })
}

/// Logout handler
pub async fn logout(State(config): State<Arc<AppConfig>>) -> impl IntoResponse {
    (
        [(SET_COOKIE, clear_session_cookie(config.environment.is_production()))],
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
}
