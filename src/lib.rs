//! PulseChat - Main Library
//!
//! PulseChat is a one-to-one chat backend built on Axum. Users sign up and
//! log in over HTTP, hold a WebSocket open for live delivery, and see each
//! other's online status in real time.
//!
//! # Module Structure
//!
//! - **`shared`** - Types with no server state
//!   - Message and identifier types, socket wire frames
//!   - Validation helpers, configuration, input errors
//!
//! - **`backend`** - The server
//!   - Connection registry, message router, presence notifier
//!   - Authentication, messaging HTTP API, WebSocket transport
//!   - PostgreSQL and in-memory storage
//!
//! # Usage
//!
//! ```rust,no_run
//! use pulsechat::backend::server::create_app;
//! use pulsechat::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(config).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The connection registry is the only mutable state shared between
//! connections. Everything else is either immutable after startup or owned
//! by the store.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
