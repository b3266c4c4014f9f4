/**
 * Realtime Errors
 *
 * Failures raised by the connection registry, the message router and the
 * gateway entry points.
 *
 * - `InvalidCredential` rejects a connection before any registry mutation
 * - `DuplicateHandle` means the transport registered the same socket twice
 * - `DeliveryTimeout` / `ConnectionClosed` are per-connection and never leave
 *   the router's fan-out loop
 * - `UnknownRecipient` fails a send before a message exists
 */
use thiserror::Error;

use crate::backend::messaging::StoreError;
use crate::shared::{ConnectionId, SharedError, UserId};

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("invalid credential: {reason}")]
    InvalidCredential { reason: String },

    #[error("connection {0} is already registered")]
    DuplicateHandle(ConnectionId),

    #[error("delivery to connection {0} timed out")]
    DeliveryTimeout(ConnectionId),

    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),

    #[error("recipient {0} does not exist")]
    UnknownRecipient(UserId),

    #[error(transparent)]
    Invalid(#[from] SharedError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RealtimeError {
    pub fn invalid_credential(reason: impl Into<String>) -> Self {
        Self::InvalidCredential {
            reason: reason.into(),
        }
    }

    /// Whether the failure is scoped to one connection
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::DeliveryTimeout(_) | Self::ConnectionClosed(_))
    }
}
