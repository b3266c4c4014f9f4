//! Middleware Module
//!
//! HTTP middleware for the backend server.
//!
//! - **`auth`** - session verification for protected routes

pub mod auth;

pub use auth::{require_auth, AuthUser, AuthenticatedUser};
