/**
 * Keyed Async Gates
 *
 * An async read/write lock per key, created on first use and removed once
 * nobody holds or awaits it. The router uses two sets of gates:
 *
 * - **lanes**, keyed by (sender, recipient) and always taken exclusively,
 *   so sends of one pair are delivered and stamped in order
 * - **inboxes**, keyed by recipient: sends take them shared, a connecting
 *   user takes its own exclusively while it registers and replays the
 *   backlog, so a live send can neither overtake the backlog nor slip past
 *   it into the store unseen
 */

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

type Gate = Arc<RwLock<()>>;

/// Gates created on demand per key
#[derive(Debug)]
pub(crate) struct KeyedGates<K: Eq + Hash + Copy> {
    gates: Mutex<HashMap<K, Gate>>,
}

impl<K: Eq + Hash + Copy> Default for KeyedGates<K> {
    fn default() -> Self {
        Self {
            gates: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Copy> KeyedGates<K> {
    fn map(&self) -> MutexGuard<'_, HashMap<K, Gate>> {
        self.gates.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ticket(&self, key: K) -> (GateTicket<'_, K>, Gate) {
        let gate = self.map().entry(key).or_default().clone();
        let ticket = GateTicket {
            gates: self,
            key,
            gate: Some(gate.clone()),
            held: None,
        };
        (ticket, gate)
    }

    /// Wait until no one else holds the gate for `key`
    pub(crate) async fn exclusive(&self, key: K) -> GateTicket<'_, K> {
        let (mut ticket, gate) = self.ticket(key);
        ticket.held = Some(Held::Exclusive(gate.write_owned().await));
        ticket
    }

    /// Wait until no one holds the gate for `key` exclusively
    pub(crate) async fn shared(&self, key: K) -> GateTicket<'_, K> {
        let (mut ticket, gate) = self.ticket(key);
        ticket.held = Some(Held::Shared(gate.read_owned().await));
        ticket
    }

    /// Number of gates currently held or awaited
    pub(crate) fn len(&self) -> usize {
        self.map().len()
    }
}

/// Guard kept alive only for its drop
#[allow(dead_code)]
#[derive(Debug)]
enum Held {
    Shared(OwnedRwLockReadGuard<()>),
    Exclusive(OwnedRwLockWriteGuard<()>),
}

/// Use of one gate; released on drop
///
/// Dropped while still waiting (a cancelled send), it only gives up its
/// place in the queue.
pub(crate) struct GateTicket<'a, K: Eq + Hash + Copy> {
    gates: &'a KeyedGates<K>,
    key: K,
    gate: Option<Gate>,
    held: Option<Held>,
}

impl<K: Eq + Hash + Copy> Drop for GateTicket<'_, K> {
    fn drop(&mut self) {
        self.held.take();
        self.gate.take();

        let mut map = self.gates.map();
        // Only the map's own reference left: nobody holds or awaits it.
        if map.get(&self.key).is_some_and(|gate| Arc::strong_count(gate) == 1) {
            map.remove(&self.key);
        }
    }
}
