//! Backend Module
//!
//! All server-side code: the HTTP surface, the WebSocket transport, and the
//! realtime core that both of them drive.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, database
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`realtime`** - Connection registry, message router, presence notifier
//! - **`socket`** - WebSocket upgrade and per-connection tasks
//! - **`messaging`** - Message storage and the messaging HTTP handlers
//! - **`auth`** - Signup, login, JWT sessions, user records
//! - **`middleware`** - Request authentication
//! - **`error`** - Backend error type and its HTTP response
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── realtime/       - Presence and message routing core
//! ├── socket/         - WebSocket transport
//! ├── messaging/      - Store traits, Postgres and in-memory stores
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the configuration, the realtime gateway, the storage
//! collaborators, the session verifier and the optional database pool.
//! Handlers extract only the pieces they need via `FromRef`.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Presence and message routing core
pub mod realtime;

/// WebSocket transport
pub mod socket;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Message storage and HTTP handlers
pub mod messaging;

/// Re-export commonly used types
pub use error::BackendError;
pub use realtime::{ConnectionRegistry, MessageRouter, PresenceNotifier, RealtimeGateway};
pub use server::create_app;
