/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are used in HTTP handlers and can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Handler errors carry their own status code: missing fields, bad
 * credentials, a database that is not configured.
 *
 * ## Realtime Errors
 *
 * Errors from the routing core keep their meaning over HTTP: an unknown
 * recipient is a 404, an invalid body a 400, an invalid credential a 401.
 *
 * ## Infrastructure Errors
 *
 * Database, hashing and token failures are 500s. Their details are logged
 * and never returned to the client.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::messaging::StoreError;
use crate::backend::realtime::RealtimeError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use axum::http::StatusCode;
/// use pulsechat::backend::error::BackendError;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
///
/// let err = BackendError::unavailable("Database not configured");
/// assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Application state error (a required service is missing or broken)
    #[error("State error: {message}")]
    StateError {
        /// Human-readable error message
        message: String,
    },

    /// Shared error (validation or serialization)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Error raised by the realtime core
    #[error(transparent)]
    Realtime(#[from] RealtimeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    /// A required service (such as the database) is not configured
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Create a new state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `SharedError` - 400 for validation, 500 for serialization
    /// - `Realtime` - 401 invalid credential, 404 unknown recipient,
    ///   400 invalid input, 500 otherwise
    /// - everything else - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::SharedError(err) => shared_status(err),
            Self::Realtime(err) => match err {
                RealtimeError::InvalidCredential { .. } => StatusCode::UNAUTHORIZED,
                RealtimeError::UnknownRecipient(_) => StatusCode::NOT_FOUND,
                RealtimeError::Invalid(shared) => shared_status(shared),
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::StateError { .. }
            | Self::Store(_)
            | Self::Database(_)
            | Self::Token(_)
            | Self::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the client
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::SharedError(err) => err.user_message(),
            Self::Realtime(RealtimeError::Invalid(err)) => err.user_message(),
            Self::Realtime(RealtimeError::UnknownRecipient(_)) => "User not found".to_string(),
            Self::Realtime(RealtimeError::InvalidCredential { .. }) => {
                "Unauthorized - Invalid Token".to_string()
            }
            _ => "Internal Server Error".to_string(),
        }
    }
}

fn shared_status(err: &SharedError) -> StatusCode {
    match err {
        SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
        SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
