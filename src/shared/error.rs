//! Shared Error Types
//!
//! Errors that can be raised while decoding frames or validating user input,
//! independent of which surface (HTTP or socket) received the data.
//!
//! # Usage
//!
//! ```rust
//! use pulsechat::shared::error::SharedError;
//!
//! let error = SharedError::validation("email", "Invalid email format");
//! assert!(error.to_string().contains("email"));
//! ```
use thiserror::Error;

/// Input and encoding errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Message suitable for an end user (no field prefix)
    pub fn user_message(&self) -> String {
        match self {
            Self::SerializationError { message } => message.clone(),
            Self::ValidationError { message, .. } => message.clone(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
