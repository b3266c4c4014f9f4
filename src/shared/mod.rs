//! Shared Module
//!
//! Types shared by every surface of the server: the domain message, the
//! socket wire frames, validation helpers, configuration and the input
//! error type. Nothing in here holds mutable state.

/// Identifiers and the direct message type
pub mod message;

/// Socket wire frames
pub mod event;

/// Shared error types
pub mod error;

/// Input validation helpers
pub mod validation;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use message::{ConnectionId, DeliveryState, Message, UserId};
pub use event::{ClientFrame, PresenceState, ServerFrame};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Environment};
