//! Realtime integration tests
//!
//! Drive the gateway the way the socket transport does and observe the
//! frames that land in each connection's queue. `ws_test` goes through a
//! real socket instead.

pub mod delivery_test;
pub mod presence_test;
pub mod ws_test;
