//! In-memory collaborators for tests and database-less runs

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{InterestResolver, MessageStore, StoreResult, UserDirectory};
use crate::shared::{DeliveryState, Message, UserId};

/// In-memory message store, user directory and interest resolver
///
/// Interest defaults to every other known user. Once a user has explicit
/// contacts, only those contacts are interested in it.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    messages: Arc<RwLock<Vec<Message>>>,
    users: Arc<RwLock<HashSet<UserId>>>,
    contacts: Arc<RwLock<HashMap<UserId, HashSet<UserId>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a user known to the directory
    pub async fn add_user(&self, user: UserId) {
        self.users.write().await.insert(user);
    }

    /// Link two users as contacts of each other
    pub async fn add_contact(&self, a: UserId, b: UserId) {
        let mut contacts = self.contacts.write().await;
        contacts.entry(a).or_default().insert(b);
        contacts.entry(b).or_default().insert(a);
    }

    /// Every stored message, in insertion order
    pub async fn all_messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    async fn insert(&self, message: &Message) {
        self.messages.write().await.push(message.clone());
    }
}

fn oldest_first(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by_key(|m| m.created_at);
    messages
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn persist_undelivered(&self, message: &Message) -> StoreResult<()> {
        self.insert(message).await;
        Ok(())
    }

    async fn record_delivered(&self, message: &Message) -> StoreResult<()> {
        self.insert(message).await;
        Ok(())
    }

    async fn fetch_history(&self, user: UserId, since: DateTime<Utc>) -> StoreResult<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(oldest_first(
            messages
                .iter()
                .filter(|m| m.involves(user) && m.created_at >= since)
                .cloned()
                .collect(),
        ))
    }

    async fn fetch_conversation(&self, a: UserId, b: UserId) -> StoreResult<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(oldest_first(
            messages.iter().filter(|m| m.is_between(a, b)).cloned().collect(),
        ))
    }

    async fn undelivered_for(&self, user: UserId) -> StoreResult<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(oldest_first(
            messages
                .iter()
                .filter(|m| {
                    m.recipient_id == user && m.delivery_state == DeliveryState::PersistedUndelivered
                })
                .cloned()
                .collect(),
        ))
    }

    async fn mark_delivered(&self, ids: &[Uuid]) -> StoreResult<()> {
        let mut messages = self.messages.write().await;
        for message in messages.iter_mut().filter(|m| ids.contains(&m.id)) {
            message.advance(DeliveryState::Delivered);
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn user_exists(&self, user: UserId) -> StoreResult<bool> {
        Ok(self.users.read().await.contains(&user))
    }
}

#[async_trait]
impl InterestResolver for InMemoryStore {
    async fn interested_parties(&self, user: UserId) -> StoreResult<HashSet<UserId>> {
        if let Some(contacts) = self.contacts.read().await.get(&user) {
            return Ok(contacts.iter().copied().filter(|c| *c != user).collect());
        }
        let users = self.users.read().await;
        Ok(users.iter().copied().filter(|u| *u != user).collect())
    }
}
