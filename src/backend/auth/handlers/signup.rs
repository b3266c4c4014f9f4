/**
 * Signup Handler
 *
 * POST /api/auth/signup
 *
 * # Registration Process
 *
 * 1. Require full name, email and password
 * 2. Validate email format and password length
 * 3. Reject an email that is already registered
 * 4. Hash password using bcrypt
 * 5. Create user, issue the session cookie, return 201
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use bcrypt::{hash, DEFAULT_COST};
use sqlx::PgPool;

use crate::backend::auth::handlers::types::{required, SessionResponse, SignupRequest};
use crate::backend::auth::sessions::{session_cookie, JwtVerifier};
use crate::backend::auth::users::{create_user, get_user_by_email, is_unique_violation, NewUser};
use crate::backend::error::BackendError;
use crate::shared::validation::{avatar_color_for, is_valid_email, sanitize_input, validate_password};
use crate::shared::{AppConfig, UserId};
use std::sync::Arc;

/// Sign up handler
///
/// # Errors
///
/// * `400 Bad Request` - missing field, invalid email, short password, or
///   "User already exists"
/// * `503 Service Unavailable` - database not configured
pub async fn signup(
    State(pool): State<Option<PgPool>>,
    State(sessions): State<JwtVerifier>,
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, BackendError> {
    let pool = pool.ok_or_else(|| BackendError::unavailable("Database not configured"))?;

    let (Some(full_name), Some(email), Some(password)) = (
        required(&request.full_name),
        required(&request.email),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(BackendError::bad_request("All fields are required"));
    };

    let full_name = sanitize_input(full_name);
    let email = email.to_lowercase();
    tracing::info!(email = %email, "[Auth] Signup request");

    if !is_valid_email(&email) {
        return Err(BackendError::bad_request("Invalid email format"));
    }
    validate_password(password)?;

    if get_user_by_email(&pool, &email).await?.is_some() {
        tracing::warn!(email = %email, "[Auth] Email already registered");
        return Err(BackendError::bad_request("User already exists"));
    }

    let password = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(|e| BackendError::state(format!("hashing task failed: {}", e)))??;

    let new_user = NewUser {
        full_name,
        avatar_color: avatar_color_for(email.as_bytes()).to_string(),
        email,
        password_hash,
    };
    let user = match create_user(&pool, new_user).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(BackendError::bad_request("User already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    let token = sessions.create_token(UserId(user.id))?;
    tracing::info!(user_id = %user.id, "[Auth] User created");

    Ok((
        StatusCode::CREATED,
        SessionResponse {
            user: user.into(),
            cookie: session_cookie(&token, config.environment.is_production()),
        },
    ))
}
