//! Authentication Module
//!
//! Accounts, sessions and the credential verifier used by the socket layer.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and database operations
//! ├── sessions.rs     - JWT tokens and the session cookie
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: full name, email and password → user created → `jwt` cookie set
//! 2. **Login**: email and password → credentials verified → `jwt` cookie set
//! 3. **Check**: cookie or Bearer token → verified → current user returned
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens expire after 15 days
//! - The cookie is `HttpOnly`, `SameSite=Strict`, and `Secure` in production

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::{check_auth, login, logout, signup, update_profile};
pub use sessions::JwtVerifier;
pub use users::PublicUser;
