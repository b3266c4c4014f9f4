/**
 * Presence Event Channel
 *
 * Registry mutations that flip a user between offline and online are
 * published on a `tokio::sync::broadcast` channel. The channel is bounded:
 * when a subscriber falls behind it loses the oldest events and is told how
 * many it missed (`RecvError::Lagged`). Publishing never blocks the
 * registry.
 */

use tokio::sync::broadcast;

use crate::shared::{PresenceState, UserId};

/// A user crossed the 0 ↔ 1 connection boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceChange {
    pub user_id: UserId,
    pub state: PresenceState,
}

impl PresenceChange {
    pub fn online(user_id: UserId) -> Self {
        Self {
            user_id,
            state: PresenceState::Online,
        }
    }

    pub fn offline(user_id: UserId) -> Self {
        Self {
            user_id,
            state: PresenceState::Offline,
        }
    }
}

/// Sending side of the presence event channel
pub type PresenceChannel = broadcast::Sender<PresenceChange>;

/// Create a presence channel with the given capacity
pub fn presence_channel(capacity: usize) -> PresenceChannel {
    broadcast::channel(capacity.max(1)).0
}

/// Publish a presence change to every subscriber
///
/// # Returns
///
/// Number of subscribers that will see the event (0 if none)
pub fn publish_change(channel: &PresenceChannel, change: PresenceChange) -> usize {
    match channel.send(change) {
        Ok(subscriber_count) => {
            tracing::debug!(
                user_id = %change.user_id,
                state = change.state.as_str(),
                subscribers = subscriber_count,
                "[Realtime] Presence change published"
            );
            subscriber_count
        }
        Err(_) => {
            // No subscribers, that's okay
            tracing::debug!(user_id = %change.user_id, "[Realtime] No presence subscribers");
            0
        }
    }
}
