/**
 * Connection Handles
 *
 * A `ConnectionHandle` is the registry's view of one live socket: its id and
 * the sending half of a bounded frame queue. The socket actor owns the
 * receiving half and writes whatever arrives to the wire, so frames pushed
 * into one handle reach the client in push order.
 */
use std::hash::{Hash, Hasher};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};

use crate::backend::realtime::error::RealtimeError;
use crate::shared::{ConnectionId, ServerFrame};

/// Sending side of one live connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::Sender<ServerFrame>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, outbound: mpsc::Sender<ServerFrame>) -> Self {
        Self { id, outbound }
    }

    /// Create a handle with a fresh id and its receiving half
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<ServerFrame>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(ConnectionId::new(), tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether the receiving side is gone
    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }

    /// Queue a frame, waiting at most `timeout` for buffer space
    pub async fn deliver(&self, frame: ServerFrame, timeout: Duration) -> Result<(), RealtimeError> {
        self.outbound
            .send_timeout(frame, timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => RealtimeError::DeliveryTimeout(self.id),
                SendTimeoutError::Closed(_) => RealtimeError::ConnectionClosed(self.id),
            })
    }

    /// Queue a frame without waiting
    ///
    /// A full buffer is reported as `DeliveryTimeout`.
    pub fn try_deliver(&self, frame: ServerFrame) -> Result<(), RealtimeError> {
        self.outbound.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => RealtimeError::DeliveryTimeout(self.id),
            TrySendError::Closed(_) => RealtimeError::ConnectionClosed(self.id),
        })
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

impl Hash for ConnectionHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
