/**
 * Presence Notifier
 *
 * Consumes the registry's presence channel in a single background task and
 * pushes `presence` frames to the online users interested in each change.
 *
 * Events are handled one at a time, in channel order, so two changes for the
 * same user reach every observer in the order the registry produced them.
 * Frames are queued with `try_deliver`: a full connection buffer drops the
 * frame instead of stalling the notifier, and the registry never waits on
 * any of this.
 */

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::backend::messaging::InterestResolver;
use crate::backend::realtime::broadcast::PresenceChange;
use crate::backend::realtime::error::RealtimeError;
use crate::backend::realtime::registry::ConnectionRegistry;
use crate::shared::{PresenceState, ServerFrame, UserId};

pub struct PresenceNotifier {
    registry: Arc<ConnectionRegistry>,
    interests: Arc<dyn InterestResolver>,
    events: broadcast::Receiver<PresenceChange>,
}

impl PresenceNotifier {
    /// Subscribe to the registry
    ///
    /// Changes published before this call are not seen, so build the
    /// notifier before accepting connections.
    pub fn new(registry: Arc<ConnectionRegistry>, interests: Arc<dyn InterestResolver>) -> Self {
        let events = registry.subscribe();
        Self {
            registry,
            interests,
            events,
        }
    }

    /// Run the notifier on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        tracing::info!("[Presence] Notifier started");
        loop {
            match self.events.recv().await {
                Ok(change) => {
                    broadcast_presence(
                        &self.registry,
                        self.interests.as_ref(),
                        change.user_id,
                        change.state,
                    )
                    .await;
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "[Presence] Notifier lagged, oldest changes dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::info!("[Presence] Notifier stopped");
    }
}

/// Push `user`'s new presence state to every interested online peer
///
/// # Returns
///
/// Number of connections that accepted the frame
pub async fn broadcast_presence(
    registry: &ConnectionRegistry,
    interests: &dyn InterestResolver,
    user: UserId,
    state: PresenceState,
) -> usize {
    let parties = match interests.interested_parties(user).await {
        Ok(parties) => parties,
        Err(e) => {
            tracing::error!(user_id = %user, error = %e, "[Presence] Failed to resolve interested parties");
            return 0;
        }
    };

    let frame = ServerFrame::Presence {
        user_id: user,
        state,
    };
    let mut delivered = 0;

    for peer in parties.into_iter().filter(|p| *p != user) {
        for handle in registry.connections_for(peer) {
            match handle.try_deliver(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(RealtimeError::ConnectionClosed(id)) => {
                    tracing::debug!(connection_id = %id, "[Presence] Peer connection closed, evicting");
                    registry.unregister(id);
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %handle.id(),
                        error = %e,
                        "[Presence] Frame dropped"
                    );
                }
            }
        }
    }

    tracing::debug!(
        user_id = %user,
        state = state.as_str(),
        delivered,
        "[Presence] Broadcast complete"
    );
    delivered
}
