//! Realtime Module
//!
//! The presence and message routing core: who is connected, where a message
//! goes, and who hears about presence changes.
//!
//! # Architecture
//!
//! - **`registry`** - user ↔ connection maps, the only mutable shared state
//! - **`router`** - direct message fan-out with per-pair ordering
//! - **`presence`** - background notifier for online/offline transitions
//! - **`gateway`** - connect/disconnect/send entry points for the transports
//! - **`sweeper`** - idle connection eviction
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - Presence event channel
//! ├── credentials.rs  - Credential verifier seam
//! ├── error.rs        - RealtimeError
//! ├── gateway.rs      - Transport entry points
//! ├── gates.rs        - Per-pair lanes and per-recipient inbox gates
//! ├── handle.rs       - ConnectionHandle
//! ├── presence.rs     - PresenceNotifier
//! ├── registry.rs     - ConnectionRegistry
//! ├── router.rs       - MessageRouter
//! └── sweeper.rs      - Idle sweeper task
//! ```
//!
//! # Data Flow
//!
//! A socket is accepted, `on_connect` verifies its credential and registers
//! it, and the registry publishes a presence change if the user just came
//! online. The notifier picks that up and pushes `presence` frames to
//! interested peers. Sends from HTTP or the socket go through the router,
//! which looks the recipient up in the registry and delivers to every live
//! connection or falls back to the store.

/// Presence event channel
pub mod broadcast;

pub mod credentials;
pub mod error;
pub mod gateway;
pub(crate) mod gates;
pub mod handle;
pub mod presence;
pub mod registry;
pub mod router;
pub mod sweeper;

// Re-export commonly used types and functions
pub use broadcast::{PresenceChange, PresenceChannel};
pub use credentials::CredentialVerifier;
pub use error::RealtimeError;
pub use gateway::{GatewaySettings, RealtimeGateway};
pub use handle::ConnectionHandle;
pub use presence::{broadcast_presence, PresenceNotifier};
pub use registry::ConnectionRegistry;
pub use router::MessageRouter;
pub use sweeper::spawn_idle_sweeper;
