/**
 * Realtime Gateway
 *
 * The entry points the transport and the message API call:
 *
 * - `on_connect(handle, credential)` verifies, registers, then sends the
 *   new connection a presence snapshot and the user's undelivered backlog.
 *   It holds the user's inbox exclusively from registration to the end of
 *   the replay, so no live send overtakes or misses the backlog
 * - `on_disconnect(handle)` deregisters before the transport lets go
 * - `send(sender, recipient, body)` routes a direct message
 * - `typing(from, to, is_typing)` relays a best-effort typing indicator
 *
 * The gateway owns no connection state of its own; everything mutable lives
 * in the `ConnectionRegistry`.
 */

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::backend::messaging::{Collaborators, InterestResolver, MessageStore};
use crate::backend::realtime::credentials::CredentialVerifier;
use crate::backend::realtime::error::RealtimeError;
use crate::backend::realtime::handle::ConnectionHandle;
use crate::backend::realtime::registry::ConnectionRegistry;
use crate::backend::realtime::router::MessageRouter;
use crate::shared::{AppConfig, ConnectionId, DeliveryState, Message, ServerFrame, UserId};

/// Tunables for the realtime core
#[derive(Debug, Clone, Copy)]
pub struct GatewaySettings {
    pub delivery_timeout: Duration,
    pub connection_buffer: usize,
    pub presence_channel_capacity: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            delivery_timeout: Duration::from_millis(2000),
            connection_buffer: 64,
            presence_channel_capacity: 1024,
        }
    }
}

impl From<&AppConfig> for GatewaySettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            delivery_timeout: config.delivery_timeout,
            connection_buffer: config.connection_buffer,
            presence_channel_capacity: config.presence_channel_capacity,
        }
    }
}

pub struct RealtimeGateway {
    registry: Arc<ConnectionRegistry>,
    router: MessageRouter,
    verifier: Arc<dyn CredentialVerifier>,
    store: Arc<dyn MessageStore>,
    interests: Arc<dyn InterestResolver>,
    settings: GatewaySettings,
}

impl RealtimeGateway {
    /// Build the gateway around a fresh registry
    pub fn new(
        settings: GatewaySettings,
        collaborators: Collaborators,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(settings.presence_channel_capacity));
        let router = MessageRouter::new(
            registry.clone(),
            collaborators.store.clone(),
            collaborators.directory,
            settings.delivery_timeout,
        );
        Self {
            registry,
            router,
            verifier,
            store: collaborators.store,
            interests: collaborators.interests,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn interests(&self) -> &Arc<dyn InterestResolver> {
        &self.interests
    }

    /// Create a handle for a new socket and the queue its writer drains
    pub fn open_connection(&self) -> (ConnectionHandle, mpsc::Receiver<ServerFrame>) {
        ConnectionHandle::channel(self.settings.connection_buffer)
    }

    /// Authenticate and register a new connection
    ///
    /// # Errors
    ///
    /// `InvalidCredential` (nothing registered) or `DuplicateHandle`.
    pub async fn on_connect(
        &self,
        handle: ConnectionHandle,
        credential: &str,
    ) -> Result<UserId, RealtimeError> {
        let user = match self.verifier.verify(credential) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(connection_id = %handle.id(), error = %e, "[Gateway] Connection rejected");
                return Err(e);
            }
        };

        // Live sends to `user` wait here until the backlog is on the wire.
        let _inbox = self.router.claim_inbox(user).await;

        self.registry.register(user, handle.clone())?;
        tracing::info!(user_id = %user, connection_id = %handle.id(), "[Gateway] User connected");

        self.send_snapshot(user, &handle).await;
        self.replay_backlog(user, &handle).await;
        Ok(user)
    }

    /// Deregister a connection; safe to call more than once
    pub fn on_disconnect(&self, handle: &ConnectionHandle) -> Option<UserId> {
        let user = self.registry.unregister(handle.id());
        if let Some(user) = user {
            tracing::info!(user_id = %user, connection_id = %handle.id(), "[Gateway] User disconnected");
        }
        user
    }

    /// Route a direct message
    pub async fn send(
        &self,
        sender: UserId,
        recipient: UserId,
        body: &str,
    ) -> Result<Message, RealtimeError> {
        self.router.send(sender, recipient, body).await
    }

    /// Relay a typing indicator to the recipient's connections
    ///
    /// Never blocks and never evicts. Returns how many connections took it.
    pub fn typing(&self, from: UserId, to: UserId, is_typing: bool) -> usize {
        let frame = ServerFrame::Typing { from, is_typing };
        self.registry
            .connections_for(to)
            .iter()
            .filter(|handle| handle.try_deliver(frame.clone()).is_ok())
            .count()
    }

    /// Record inbound activity on a connection
    pub fn touch(&self, connection_id: ConnectionId) -> bool {
        self.registry.touch(connection_id)
    }

    pub fn is_registered(&self, connection_id: ConnectionId) -> bool {
        self.registry.contains(connection_id)
    }

    pub fn is_online(&self, user: UserId) -> bool {
        self.registry.is_online(user)
    }

    async fn send_snapshot(&self, user: UserId, handle: &ConnectionHandle) {
        let parties = match self.interests.interested_parties(user).await {
            Ok(parties) => parties,
            Err(e) => {
                tracing::warn!(user_id = %user, error = %e, "[Gateway] Presence snapshot skipped");
                return;
            }
        };

        let mut online: Vec<UserId> = parties
            .into_iter()
            .filter(|peer| *peer != user && self.registry.is_online(*peer))
            .collect();
        online.sort();

        if let Err(e) = handle
            .deliver(ServerFrame::PresenceSnapshot { online }, self.settings.delivery_timeout)
            .await
        {
            tracing::warn!(connection_id = %handle.id(), error = %e, "[Gateway] Presence snapshot not delivered");
        }
    }

    async fn replay_backlog(&self, user: UserId, handle: &ConnectionHandle) {
        let backlog = match self.store.undelivered_for(user).await {
            Ok(backlog) => backlog,
            Err(e) => {
                tracing::warn!(user_id = %user, error = %e, "[Gateway] Backlog replay skipped");
                return;
            }
        };
        if backlog.is_empty() {
            return;
        }

        let mut replayed = Vec::with_capacity(backlog.len());
        for mut message in backlog {
            message.advance(DeliveryState::Delivered);
            let id = message.id;
            match handle
                .deliver(ServerFrame::NewMessage { message }, self.settings.delivery_timeout)
                .await
            {
                Ok(()) => replayed.push(id),
                Err(e) => {
                    // The rest stays persisted-undelivered for the next connect.
                    tracing::warn!(connection_id = %handle.id(), error = %e, "[Gateway] Backlog replay interrupted");
                    break;
                }
            }
        }

        if let Err(e) = self.store.mark_delivered(&replayed).await {
            tracing::error!(user_id = %user, error = %e, "[Gateway] Failed to mark backlog delivered");
            return;
        }
        tracing::info!(user_id = %user, replayed = replayed.len(), "[Gateway] Backlog replayed");
    }
}
