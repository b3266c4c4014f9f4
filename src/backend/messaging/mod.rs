//! Messaging Module
//!
//! Persistence, directory and interest collaborators used by the realtime
//! core, plus the HTTP message API built on top of them.

pub mod store;
pub mod memory;
pub mod db;
pub mod handlers;

use std::sync::Arc;

use sqlx::PgPool;

pub use db::PgMessageStore;
pub use memory::InMemoryStore;
pub use store::{InterestResolver, MessageStore, StoreError, StoreResult, UserDirectory};

/// The three collaborators the realtime core consumes
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn MessageStore>,
    pub directory: Arc<dyn UserDirectory>,
    pub interests: Arc<dyn InterestResolver>,
}

impl Collaborators {
    /// Back every collaborator with one in-memory store
    pub fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            store: store.clone(),
            directory: store.clone(),
            interests: store,
        }
    }

    /// Back every collaborator with Postgres
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgMessageStore::new(pool));
        Self {
            store: store.clone(),
            directory: store.clone(),
            interests: store,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
