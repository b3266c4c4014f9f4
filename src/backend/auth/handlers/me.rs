/**
 * Current User Handlers
 *
 * GET /api/auth/check returns the authenticated user; PUT
 * /api/auth/update-profile changes the display name and/or profile picture
 * URL. Both sit behind `require_auth`.
 */

use axum::{extract::State, response::Json};
use sqlx::PgPool;

use crate::backend::auth::handlers::types::{required, UpdateProfileRequest};
use crate::backend::auth::users::{get_user_by_id, update_profile as update_user_profile, PublicUser};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::shared::validation::sanitize_input;

/// Current user handler
pub async fn check_auth(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> Result<Json<PublicUser>, BackendError> {
    let pool = pool.ok_or_else(|| BackendError::unavailable("Database not configured"))?;

    let user = get_user_by_id(&pool, auth.user_id.as_uuid())
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

/// Profile update handler
///
/// # Errors
///
/// * `400 Bad Request` - neither field given
/// * `404 Not Found` - account was deleted
pub async fn update_profile(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, BackendError> {
    let pool = pool.ok_or_else(|| BackendError::unavailable("Database not configured"))?;

    let full_name = required(&request.full_name).map(sanitize_input);
    let profile_pic = required(&request.profile_pic).map(str::to_string);
    if full_name.is_none() && profile_pic.is_none() {
        return Err(BackendError::bad_request("Profile pic or full name is required"));
    }

    let user = update_user_profile(
        &pool,
        auth.user_id.as_uuid(),
        full_name.as_deref(),
        profile_pic.as_deref(),
    )
    .await?
    .ok_or_else(|| BackendError::not_found("User not found"))?;

    tracing::info!(user_id = %user.id, "[Auth] Profile updated");
    Ok(Json(user.into()))
}
