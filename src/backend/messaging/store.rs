//! Collaborator traits consumed by the realtime core
//!
//! The router, presence notifier and gateway only talk to persistence and
//! account data through these traits, so the core runs the same against
//! Postgres or the in-memory store.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::{Message, UserId};

/// Failures raised by a storage collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Message persistence
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Keep a message nobody could receive for later retrieval
    async fn persist_undelivered(&self, message: &Message) -> StoreResult<()>;

    /// Record a message that reached at least one live connection
    async fn record_delivered(&self, message: &Message) -> StoreResult<()>;

    /// Every message `user` sent or received at or after `since`, oldest first
    async fn fetch_history(&self, user: UserId, since: DateTime<Utc>) -> StoreResult<Vec<Message>>;

    /// The conversation between two users, oldest first
    async fn fetch_conversation(&self, a: UserId, b: UserId) -> StoreResult<Vec<Message>>;

    /// Messages addressed to `user` that are still persisted-undelivered, oldest first
    async fn undelivered_for(&self, user: UserId) -> StoreResult<Vec<Message>>;

    /// Advance the given messages to delivered
    async fn mark_delivered(&self, ids: &[Uuid]) -> StoreResult<()>;
}

/// Account lookups
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, user: UserId) -> StoreResult<bool>;
}

/// Who should hear about a user's presence
#[async_trait]
pub trait InterestResolver: Send + Sync {
    /// Users interested in `user`'s online/offline transitions
    ///
    /// The result never contains `user` itself.
    async fn interested_parties(&self, user: UserId) -> StoreResult<HashSet<UserId>>;
}
