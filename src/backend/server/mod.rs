//! Server Module
//!
//! Server initialization, application state and database loading.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Database loading and migrations
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use pulsechat::backend::server::create_app;
//! use pulsechat::shared::AppConfig;
//!
//! # async fn example() {
//! let config = AppConfig::builder().jwt_secret("secret").build().unwrap();
//! let app = create_app(config).await;
//! # }
//! ```

/// Application state management
pub mod state;

/// Database loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::{create_app, start_background_tasks};
pub use state::AppState;
