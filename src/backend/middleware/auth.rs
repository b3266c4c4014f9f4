/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require user
 * authentication. The session token is read from the `jwt` cookie or an
 * `Authorization: Bearer` header, verified, and the user is attached to the
 * request extensions for handlers to pick up with `AuthUser`.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::backend::auth::sessions::token_from_headers;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::realtime::CredentialVerifier;
use crate::backend::server::state::AppState;
use crate::shared::UserId;

/// Authenticated user data extracted from the session token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Authentication middleware
///
/// 1. Extracts the token from the cookie or Authorization header
/// 2. Verifies it and resolves the user id
/// 3. Checks the account still exists when a database is configured
/// 4. Attaches `AuthenticatedUser` to the request extensions
///
/// Returns 401 if the token is missing or invalid, 404 if the account is gone.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = token_from_headers(request.headers()).ok_or_else(|| {
        tracing::warn!("[Auth] Missing session token");
        BackendError::unauthorized("Unauthorized - No Token Provided")
    })?;

    let user_id = app_state.sessions.verify(&token).map_err(|e| {
        tracing::warn!(error = %e, "[Auth] Invalid session token");
        BackendError::unauthorized("Unauthorized - Invalid Token")
    })?;

    if let Some(pool) = &app_state.db_pool {
        if get_user_by_id(pool, user_id.as_uuid()).await?.is_none() {
            tracing::warn!(user_id = %user_id, "[Auth] Token for deleted user");
            return Err(BackendError::not_found("User not found"));
        }
    }

    request.extensions_mut().insert(AuthenticatedUser { user_id });
    Ok(next.run(request).await)
}

/// Axum extractor for the user attached by `require_auth`
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("Unauthorized - No Token Provided")
            })?;

        Ok(AuthUser(user))
    }
}
