//! Property-based tests for ConnectionRegistry
//!
//! A random sequence of register/unregister operations is applied to a
//! registry and to a plain model; after every step the two must agree.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use pulsechat::backend::realtime::{ConnectionHandle, ConnectionRegistry};
use pulsechat::shared::{ConnectionId, ServerFrame, UserId};
use tokio::sync::mpsc;

const USERS: usize = 3;
const HANDLES: usize = 6;

#[derive(Debug, Clone)]
enum Op {
    Register { user: usize, handle: usize },
    Unregister { handle: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..USERS, 0..HANDLES).prop_map(|(user, handle)| Op::Register { user, handle }),
        (0..HANDLES).prop_map(|handle| Op::Unregister { handle }),
    ]
}

struct Fixture {
    users: Vec<UserId>,
    handles: Vec<ConnectionHandle>,
    _receivers: Vec<mpsc::Receiver<ServerFrame>>,
}

fn fixture() -> Fixture {
    let (handles, receivers) = (0..HANDLES).map(|_| ConnectionHandle::channel(4)).unzip();
    Fixture {
        users: (0..USERS).map(|_| UserId::new()).collect(),
        handles,
        _receivers: receivers,
    }
}

proptest! {
    #[test]
    fn test_registry_matches_model(ops in prop::collection::vec(op(), 0..60)) {
        let fx = fixture();
        let registry = ConnectionRegistry::new(16);
        // handle index -> user index
        let mut model: HashMap<usize, usize> = HashMap::new();

        for op in ops {
            match op {
                Op::Register { user, handle } => {
                    let result = registry.register(fx.users[user], fx.handles[handle].clone());
                    if model.contains_key(&handle) {
                        prop_assert!(result.is_err());
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert(handle, user);
                    }
                }
                Op::Unregister { handle } => {
                    let owner = registry.unregister(fx.handles[handle].id());
                    let expected = model.remove(&handle).map(|u| fx.users[u]);
                    prop_assert_eq!(owner, expected);
                }
            }

            for (u, user) in fx.users.iter().enumerate() {
                let actual: HashSet<ConnectionId> = registry
                    .connections_for(*user)
                    .iter()
                    .map(|h| h.id())
                    .collect();
                let expected: HashSet<ConnectionId> = model
                    .iter()
                    .filter(|(_, owner)| **owner == u)
                    .map(|(h, _)| fx.handles[*h].id())
                    .collect();
                prop_assert_eq!(&actual, &expected);
                prop_assert_eq!(registry.is_online(*user), !expected.is_empty());
            }

            let online_users: HashSet<usize> = model.values().copied().collect();
            prop_assert_eq!(registry.user_count(), online_users.len());
            prop_assert_eq!(registry.connection_count(), model.len());
        }
    }

    #[test]
    fn test_unregister_is_idempotent(
        ops in prop::collection::vec((0..USERS, 0..HANDLES), 1..20),
        target in 0..HANDLES,
    ) {
        let fx = fixture();
        let registry = ConnectionRegistry::new(16);
        for (user, handle) in ops {
            let _ = registry.register(fx.users[user], fx.handles[handle].clone());
        }

        let id = fx.handles[target].id();
        registry.unregister(id);
        let connections = registry.connection_count();
        let users = registry.user_count();
        let online: Vec<bool> = fx.users.iter().map(|u| registry.is_online(*u)).collect();

        prop_assert_eq!(registry.unregister(id), None);
        prop_assert_eq!(registry.connection_count(), connections);
        prop_assert_eq!(registry.user_count(), users);
        let after: Vec<bool> = fx.users.iter().map(|u| registry.is_online(*u)).collect();
        prop_assert_eq!(after, online);
        prop_assert!(!registry.contains(id));
    }

    #[test]
    fn test_no_empty_entries_after_full_unregister(
        ops in prop::collection::vec((0..USERS, 0..HANDLES), 0..30),
    ) {
        let fx = fixture();
        let registry = ConnectionRegistry::new(16);
        for (user, handle) in ops {
            let _ = registry.register(fx.users[user], fx.handles[handle].clone());
        }

        for handle in &fx.handles {
            registry.unregister(handle.id());
        }

        prop_assert_eq!(registry.user_count(), 0);
        prop_assert_eq!(registry.connection_count(), 0);
        prop_assert!(registry.online_users().is_empty());
        for user in &fx.users {
            prop_assert!(!registry.is_online(*user));
        }
    }
}
