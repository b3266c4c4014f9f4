//! Authentication Handlers Module
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── signup.rs   - User registration handler
//! ├── login.rs    - Login and logout handlers
//! └── me.rs       - Current user and profile update handlers
//! ```
//!
//! # Handlers
//!
//! - **`signup`** - POST /api/auth/signup
//! - **`login`** - POST /api/auth/login
//! - **`logout`** - POST /api/auth/logout
//! - **`check_auth`** - GET /api/auth/check
//! - **`update_profile`** - PUT /api/auth/update-profile

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login and logout handlers
pub mod login;

/// Current user handlers
pub mod me;

pub use types::{LoginRequest, SessionResponse, SignupRequest, UpdateProfileRequest};

pub use login::{login, logout};
pub use me::{check_auth, update_profile};
pub use signup::signup;
