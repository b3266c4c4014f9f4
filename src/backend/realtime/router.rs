/**
 * Message Router
 *
 * Turns `send(sender, recipient, body)` into a `Message` and delivers it to
 * every live connection of the recipient, or hands it to the store when
 * nobody accepted it.
 *
 * # Delivery
 *
 * Fan-out runs one delivery future per connection, each bounded by the
 * configured timeout, and joins them all. A connection that times out or is
 * closed is unregistered on the spot and does not fail the send. Only when
 * zero connections accepted the frame does the message fall back to
 * persisted-undelivered.
 *
 * # Ordering
 *
 * Sends from the same sender to the same recipient pass through a lane (an
 * exclusive gate keyed by the pair) from timestamping to persistence, so
 * each connection queues them in send order and history agrees with it.
 *
 * Every send also holds the recipient's inbox gate shared for the same span.
 * A connecting user claims its inbox exclusively while it registers and
 * replays its backlog (see `RealtimeGateway::on_connect`), so a live send
 * either lands in the backlog that is about to be replayed or is delivered
 * after it.
 */

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crate::backend::messaging::{MessageStore, UserDirectory};
use crate::backend::realtime::error::RealtimeError;
use crate::backend::realtime::gates::{GateTicket, KeyedGates};
use crate::backend::realtime::handle::ConnectionHandle;
use crate::backend::realtime::registry::ConnectionRegistry;
use crate::shared::validation::validate_message_body;
use crate::shared::{DeliveryState, Message, ServerFrame, UserId};

/// Routes direct messages to live connections
pub struct MessageRouter {
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn MessageStore>,
    directory: Arc<dyn UserDirectory>,
    lanes: KeyedGates<(UserId, UserId)>,
    inboxes: KeyedGates<UserId>,
    delivery_timeout: Duration,
}

impl MessageRouter {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn UserDirectory>,
        delivery_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            directory,
            lanes: KeyedGates::default(),
            inboxes: KeyedGates::default(),
            delivery_timeout,
        }
    }

    /// Send a direct message
    ///
    /// # Returns
    ///
    /// The message in its final state: `Delivered` if at least one live
    /// connection accepted it, `PersistedUndelivered` otherwise.
    ///
    /// # Errors
    ///
    /// - `Invalid` if the body is empty or too long after sanitizing
    /// - `UnknownRecipient` if the recipient has no account
    /// - `Store` if the directory lookup fails or an undelivered message
    ///   could not be persisted
    pub async fn send(
        &self,
        sender: UserId,
        recipient: UserId,
        body: &str,
    ) -> Result<Message, RealtimeError> {
        let body = validate_message_body(body)?;

        if !self.directory.user_exists(recipient).await? {
            tracing::warn!(
                sender_id = %sender,
                recipient_id = %recipient,
                "[Router] Send to unknown recipient rejected"
            );
            return Err(RealtimeError::UnknownRecipient(recipient));
        }

        let _lane = self.lanes.exclusive((sender, recipient)).await;
        let _inbox = self.inboxes.shared(recipient).await;

        // Stamped inside the lane so history order matches delivery order.
        let mut message = Message::new(sender, recipient, body);
        let connections = self.registry.connections_for(recipient);

        let mut outgoing = message.clone();
        outgoing.advance(DeliveryState::Delivered);
        let accepted = self
            .fan_out(&connections, ServerFrame::NewMessage { message: outgoing })
            .await;

        if accepted > 0 {
            message.advance(DeliveryState::Delivered);
            // Already on the recipient's screen; a history write failure
            // must not turn that into a send error.
            if let Err(e) = self.store.record_delivered(&message).await {
                tracing::error!(
                    message_id = %message.id,
                    error = %e,
                    "[Router] Failed to record delivered message"
                );
            }
        } else {
            message.advance(DeliveryState::PersistedUndelivered);
            self.store.persist_undelivered(&message).await?;
        }

        tracing::info!(
            message_id = %message.id,
            sender_id = %sender,
            recipient_id = %recipient,
            accepted,
            state = message.delivery_state.as_str(),
            "[Router] Message routed"
        );
        Ok(message)
    }

    /// Hold `recipient`'s inbox exclusively
    ///
    /// Sends to `recipient` wait until the ticket is dropped, and a ticket is
    /// only granted once sends already past their lookup have finished
    /// delivering or persisting.
    pub(crate) async fn claim_inbox(&self, recipient: UserId) -> GateTicket<'_, UserId> {
        self.inboxes.exclusive(recipient).await
    }

    /// Deliver `frame` to every connection concurrently
    ///
    /// Connections that fail are unregistered. Returns how many accepted.
    pub(crate) async fn fan_out(&self, connections: &[ConnectionHandle], frame: ServerFrame) -> usize {
        if connections.is_empty() {
            return 0;
        }

        let deliveries = connections
            .iter()
            .map(|handle| handle.deliver(frame.clone(), self.delivery_timeout));
        let results = join_all(deliveries).await;

        let mut accepted = 0;
        for (handle, result) in connections.iter().zip(results) {
            match result {
                Ok(()) => accepted += 1,
                Err(e) if e.is_connection_failure() => {
                    tracing::warn!(
                        connection_id = %handle.id(),
                        error = %e,
                        "[Router] Delivery failed, evicting connection"
                    );
                    self.registry.unregister(handle.id());
                }
                Err(e) => {
                    tracing::error!(
                        connection_id = %handle.id(),
                        error = %e,
                        "[Router] Unexpected delivery error"
                    );
                }
            }
        }
        accepted
    }

    #[cfg(test)]
    pub(crate) fn lane_count(&self) -> usize {
        self.lanes.len() + self.inboxes.len()
    }
}
