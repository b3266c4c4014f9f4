/**
 * Connection Registry
 *
 * Maps each online user to the set of live connections it owns, with a
 * reverse index from connection to owner so that removal never scans.
 *
 * # Invariants
 *
 * - A connection id appears under at most one user
 * - A user with no connections has no entry at all
 * - The forward and reverse indexes always describe the same pairs
 *
 * Both indexes live behind one mutex, so every mutation (and every
 * snapshot read) is linearized, including connect/disconnect races on the
 * same user. Presence changes are published while that lock is held, which
 * keeps events for one user in mutation order.
 */

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::backend::realtime::broadcast::{
    presence_channel, publish_change, PresenceChange, PresenceChannel,
};
use crate::backend::realtime::error::RealtimeError;
use crate::backend::realtime::handle::ConnectionHandle;
use crate::shared::{ConnectionId, UserId};

#[derive(Debug)]
struct ConnectionEntry {
    user_id: UserId,
    last_seen: Instant,
}

#[derive(Debug, Default)]
struct RegistryMaps {
    by_user: HashMap<UserId, HashMap<ConnectionId, ConnectionHandle>>,
    by_connection: HashMap<ConnectionId, ConnectionEntry>,
}

impl RegistryMaps {
    /// Remove one connection; returns the owner and whether it went offline
    fn remove(&mut self, connection_id: ConnectionId) -> Option<(UserId, ConnectionHandle, bool)> {
        let entry = self.by_connection.remove(&connection_id)?;
        let user_id = entry.user_id;

        let Some(handles) = self.by_user.get_mut(&user_id) else {
            tracing::error!(
                connection_id = %connection_id,
                user_id = %user_id,
                "[Registry] Reverse index points at a user with no entry"
            );
            return None;
        };

        let Some(handle) = handles.remove(&connection_id) else {
            tracing::error!(
                connection_id = %connection_id,
                user_id = %user_id,
                "[Registry] Connection missing from its owner's set"
            );
            return None;
        };

        let went_offline = handles.is_empty();
        if went_offline {
            self.by_user.remove(&user_id);
        }
        Some((user_id, handle, went_offline))
    }
}

/// Registry of live connections per user
#[derive(Debug)]
pub struct ConnectionRegistry {
    maps: Mutex<RegistryMaps>,
    events: PresenceChannel,
}

impl ConnectionRegistry {
    /// Create an empty registry whose presence channel holds `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            maps: Mutex::new(RegistryMaps::default()),
            events: presence_channel(capacity),
        }
    }

    fn maps(&self) -> MutexGuard<'_, RegistryMaps> {
        // Mutations never panic half-way, so a poisoned lock still guards
        // consistent maps.
        self.maps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to online/offline transitions
    pub fn subscribe(&self) -> broadcast::Receiver<PresenceChange> {
        self.events.subscribe()
    }

    /// Register `handle` under `user_id`
    ///
    /// # Errors
    ///
    /// `DuplicateHandle` if the connection is already registered (under any
    /// user). The registry is left untouched in that case.
    pub fn register(&self, user_id: UserId, handle: ConnectionHandle) -> Result<(), RealtimeError> {
        let connection_id = handle.id();
        let mut maps = self.maps();

        if let Some(existing) = maps.by_connection.get(&connection_id) {
            tracing::error!(
                connection_id = %connection_id,
                user_id = %user_id,
                owner = %existing.user_id,
                "[Registry] Duplicate registration rejected"
            );
            return Err(RealtimeError::DuplicateHandle(connection_id));
        }

        maps.by_connection.insert(
            connection_id,
            ConnectionEntry {
                user_id,
                last_seen: Instant::now(),
            },
        );
        let handles = maps.by_user.entry(user_id).or_default();
        handles.insert(connection_id, handle);
        let count = handles.len();

        if count == 1 {
            publish_change(&self.events, PresenceChange::online(user_id));
        }

        tracing::debug!(
            user_id = %user_id,
            connection_id = %connection_id,
            connections = count,
            "[Registry] Connection registered"
        );
        Ok(())
    }

    /// Remove a connection from whichever user owns it
    ///
    /// Unknown or already removed connections are a no-op, since a
    /// disconnect may race with eviction. Returns the former owner.
    pub fn unregister(&self, connection_id: ConnectionId) -> Option<UserId> {
        let mut maps = self.maps();
        let (user_id, _handle, went_offline) = maps.remove(connection_id)?;

        if went_offline {
            publish_change(&self.events, PresenceChange::offline(user_id));
        }

        tracing::debug!(
            user_id = %user_id,
            connection_id = %connection_id,
            went_offline,
            "[Registry] Connection unregistered"
        );
        Some(user_id)
    }

    /// Snapshot of a user's live connections
    ///
    /// The returned handles are copies; later registry mutations do not
    /// affect them.
    pub fn connections_for(&self, user_id: UserId) -> Vec<ConnectionHandle> {
        self.maps()
            .by_user
            .get(&user_id)
            .map(|handles| handles.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether the user has at least one live connection
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.maps().by_user.contains_key(&user_id)
    }

    /// Owner of a connection, if registered
    #[cfg(test)]
    pub(crate) fn owner_of(&self, connection_id: ConnectionId) -> Option<UserId> {
        self.maps()
            .by_connection
            .get(&connection_id)
            .map(|entry| entry.user_id)
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.maps().by_connection.contains_key(&connection_id)
    }

    /// Record activity on a connection; false if it is not registered
    pub fn touch(&self, connection_id: ConnectionId) -> bool {
        match self.maps().by_connection.get_mut(&connection_id) {
            Some(entry) => {
                entry.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Evict every connection silent for longer than `max_idle`
    pub fn evict_idle(&self, max_idle: Duration) -> Vec<(UserId, ConnectionHandle)> {
        let now = Instant::now();
        let mut maps = self.maps();

        let stale: Vec<ConnectionId> = maps
            .by_connection
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_seen) > max_idle)
            .map(|(id, _)| *id)
            .collect();

        let mut evicted = Vec::with_capacity(stale.len());
        for connection_id in stale {
            if let Some((user_id, handle, went_offline)) = maps.remove(connection_id) {
                if went_offline {
                    publish_change(&self.events, PresenceChange::offline(user_id));
                }
                tracing::info!(
                    user_id = %user_id,
                    connection_id = %connection_id,
                    "[Registry] Idle connection evicted"
                );
                evicted.push((user_id, handle));
            }
        }
        evicted
    }

    /// Every user with at least one live connection
    pub fn online_users(&self) -> Vec<UserId> {
        self.maps().by_user.keys().copied().collect()
    }

    pub fn connection_count(&self) -> usize {
        self.maps().by_connection.len()
    }

    pub fn user_count(&self) -> usize {
        self.maps().by_user.len()
    }
}
