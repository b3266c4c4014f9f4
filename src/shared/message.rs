/**
 * Message Data Structure
 *
 * This module defines the identifiers and the `Message` struct that flow
 * between the HTTP API, the socket layer and the persistence collaborator.
 *
 * A `Message` is created by the router on send, its `delivery_state` only
 * ever advances, and it is never deleted by the realtime core.
 */
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an authenticated user
///
/// Resolved from a verified credential and immutable once issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a fresh random identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Identifier of one live socket
///
/// A fresh id is minted for every accepted connection; handles compare
/// and hash by this id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Delivery progress of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Created, fan-out not finished yet
    Pending,
    /// At least one live connection accepted it
    Delivered,
    /// Nobody was reachable; handed to the store for later retrieval
    PersistedUndelivered,
}

impl DeliveryState {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::PersistedUndelivered => "persisted_undelivered",
        }
    }

    /// Parse the database representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "delivered" => Some(Self::Delivered),
            "persisted_undelivered" => Some(Self::PersistedUndelivered),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` is a forward transition
    pub fn can_advance_to(&self, next: DeliveryState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Delivered)
                | (Self::Pending, Self::PersistedUndelivered)
                | (Self::PersistedUndelivered, Self::Delivered)
        )
    }
}

/// A direct message between two users
///
/// # Example
/// ```rust
/// use pulsechat::shared::{DeliveryState, Message, UserId};
///
/// let mut message = Message::new(UserId::new(), UserId::new(), "hi".to_string());
/// assert_eq!(message.delivery_state, DeliveryState::Pending);
/// assert!(message.advance(DeliveryState::Delivered));
/// assert!(!message.advance(DeliveryState::Pending));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub delivery_state: DeliveryState,
}

impl Message {
    /// Create a pending message stamped with the current time
    pub fn new(sender_id: UserId, recipient_id: UserId, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            body,
            created_at: Utc::now(),
            delivery_state: DeliveryState::Pending,
        }
    }

    /// Advance the delivery state
    ///
    /// Returns `false` and leaves the message untouched when the
    /// transition would move backwards.
    pub fn advance(&mut self, next: DeliveryState) -> bool {
        if self.delivery_state.can_advance_to(next) {
            self.delivery_state = next;
            true
        } else {
            false
        }
    }

    /// Whether `user` is one of the two participants
    pub fn involves(&self, user: UserId) -> bool {
        self.sender_id == user || self.recipient_id == user
    }

    /// Whether this message belongs to the conversation between `a` and `b`
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        (self.sender_id == a && self.recipient_id == b)
            || (self.sender_id == b && self.recipient_id == a)
    }
}
