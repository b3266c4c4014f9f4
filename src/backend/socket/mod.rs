//! Socket Module
//!
//! WebSocket transport for the realtime gateway: one actor per connection,
//! JSON text frames (`ClientFrame` in, `ServerFrame` out).

pub mod actor;
pub mod handler;

pub use handler::ws_upgrade;
