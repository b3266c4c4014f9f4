/**
 * Authentication Handler Types
 *
 * Request and response bodies for the auth endpoints. Request fields are
 * optional so a missing field is reported as a 400 with a readable message
 * rather than a deserialization rejection.
 */

use axum::{
    http::header::SET_COOKIE,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::backend::auth::users::PublicUser;

/// Sign up request
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    /// Plain password (hashed before storage)
    pub password: Option<String>,
}

/// Login request
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile update; omitted fields stay unchanged
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    /// Image URL
    pub profile_pic: Option<String>,
}

/// Signup and login response: the public user plus the session cookie
///
/// The token only travels in the HttpOnly cookie, never in the body.
#[derive(Debug)]
pub struct SessionResponse {
    pub user: PublicUser,
    pub cookie: String,
}

impl IntoResponse for SessionResponse {
    fn into_response(self) -> Response {
        ([(SET_COOKIE, self.cookie)], Json(self.user)).into_response()
    }
}

/// Trim a required field, treating blank as missing
pub(crate) fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|value| !value.is_empty())
}
