//! Idle connection sweeper
//!
//! Periodically evicts connections that have shown no inbound activity for
//! longer than the idle window. The socket actor notices the eviction on its
//! next ping tick and closes the socket.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::backend::realtime::registry::ConnectionRegistry;

/// Spawn the sweeper task
pub fn spawn_idle_sweeper(
    registry: Arc<ConnectionRegistry>,
    every: Duration,
    max_idle: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let evicted = registry.evict_idle(max_idle);
            if !evicted.is_empty() {
                tracing::info!(evicted = evicted.len(), "[Sweeper] Evicted idle connections");
            }
        }
    })
}
