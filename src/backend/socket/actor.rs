/**
 * WebSocket Connection Actor
 *
 * One actor per upgraded socket. It registers the connection with the
 * realtime gateway, drains the connection's frame queue into the socket and
 * dispatches inbound `ClientFrame`s.
 *
 * Close codes:
 * - 1000: normal close, including a connection the registry has evicted
 * - 1011: the gateway refused the connection for a non-credential reason
 * - 4002: invalid or expired credential
 */

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::backend::realtime::{ConnectionHandle, RealtimeError, RealtimeGateway};
use crate::shared::{ClientFrame, ServerFrame, UserId};

/// Ping interval: server sends a WebSocket ping every 30 seconds.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// How long the writer gets to flush a close frame before it is aborted
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Close codes
const CLOSE_NORMAL: u16 = 1000;
const CLOSE_INTERNAL: u16 = 1011;
const CLOSE_TOKEN_INVALID: u16 = 4002;

/// Run the actor-per-connection pattern for one WebSocket.
///
/// - Writer task: owns the sink, drains the handle's frame queue and the
///   control channel (pings, pongs, close)
/// - Ping task: pings every 30 s and closes the socket once the registry
///   no longer knows the connection (idle eviction, failed delivery)
/// - Reader loop: decodes client frames and calls the gateway
///
/// The connection is deregistered before the socket is dropped.
pub async fn run_connection(socket: WebSocket, gateway: Arc<RealtimeGateway>, credential: String) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (handle, frames) = gateway.open_connection();
    let (control_tx, control_rx) = mpsc::unbounded_channel::<Message>();

    // Writer first, so the snapshot and backlog pushed by on_connect drain.
    let mut writer_handle = tokio::spawn(writer_task(ws_sender, frames, control_rx));

    let user_id = match gateway.on_connect(handle.clone(), &credential).await {
        Ok(user_id) => user_id,
        Err(err) => {
            let (code, reason) = match err {
                RealtimeError::InvalidCredential { .. } => (CLOSE_TOKEN_INVALID, "Token invalid"),
                _ => (CLOSE_INTERNAL, "Connection rejected"),
            };
            tracing::warn!(
                connection_id = %handle.id(),
                close_code = code,
                error = %err,
                "[Socket] Connection refused"
            );
            let _ = control_tx.send(close_message(code, reason));
            let _ = writer_handle.await;
            return;
        }
    };

    tracing::info!(user_id = %user_id, connection_id = %handle.id(), "[Socket] Actor started");

    let ping_handle = tokio::spawn(ping_task(gateway.clone(), handle.clone(), control_tx.clone()));

    let mut evicted = false;
    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => {
                if let Some(close) = touch_or_close(&gateway, &handle) {
                    let _ = control_tx.send(close);
                    evicted = true;
                    break;
                }
                match msg {
                    Message::Text(text) => {
                        handle_text_frame(&gateway, &handle, user_id, text.as_str()).await;
                    }
                    Message::Binary(_) => {
                        tracing::debug!(user_id = %user_id, "[Socket] Binary frame ignored");
                    }
                    Message::Ping(data) => {
                        let _ = control_tx.send(Message::Pong(data));
                    }
                    Message::Pong(_) => {}
                    Message::Close(frame) => {
                        tracing::info!(user_id = %user_id, reason = ?frame, "[Socket] Client initiated close");
                        break;
                    }
                }
            }
            Some(Err(e)) => {
                tracing::warn!(user_id = %user_id, error = %e, "[Socket] Receive error");
                break;
            }
            None => {
                tracing::info!(user_id = %user_id, "[Socket] Stream ended");
                break;
            }
        }
    }

    gateway.on_disconnect(&handle);
    ping_handle.abort();
    if evicted {
        let _ = tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, &mut writer_handle).await;
    }
    writer_handle.abort();

    tracing::info!(user_id = %user_id, connection_id = %handle.id(), "[Socket] Actor stopped");
}

/// Record inbound activity, or the close frame for an evicted connection
fn touch_or_close(gateway: &RealtimeGateway, handle: &ConnectionHandle) -> Option<Message> {
    if gateway.touch(handle.id()) {
        return None;
    }
    tracing::info!(connection_id = %handle.id(), "[Socket] Frame from evicted connection, closing");
    Some(close_message(CLOSE_NORMAL, "Connection evicted"))
}

/// Decode one client frame and act on it
async fn handle_text_frame(
    gateway: &RealtimeGateway,
    handle: &ConnectionHandle,
    user_id: UserId,
    text: &str,
) {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!(user_id = %user_id, error = %e, "[Socket] Malformed frame");
            let _ = handle.try_deliver(ServerFrame::error("Malformed frame"));
            return;
        }
    };

    match frame {
        ClientFrame::SendMessage { to, body } => {
            let reply = match gateway.send(user_id, to, &body).await {
                Ok(message) => ServerFrame::MessageAccepted { message },
                Err(err) => ServerFrame::error(client_reason(&err)),
            };
            if let Err(e) = handle.try_deliver(reply) {
                tracing::debug!(user_id = %user_id, error = %e, "[Socket] Send acknowledgement dropped");
            }
        }
        ClientFrame::Typing { to, is_typing } => {
            gateway.typing(user_id, to, is_typing);
        }
        ClientFrame::Ping => {
            let _ = handle.try_deliver(ServerFrame::Pong);
        }
    }
}

/// Reason shown to the client for a failed send
fn client_reason(err: &RealtimeError) -> String {
    match err {
        RealtimeError::Invalid(shared) => shared.user_message(),
        RealtimeError::UnknownRecipient(_) => "User not found".to_string(),
        _ => "Message could not be sent".to_string(),
    }
}

fn close_message(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: reason.into(),
    }))
}

/// Ping task: keeps the socket alive and closes it once evicted
async fn ping_task(
    gateway: Arc<RealtimeGateway>,
    handle: ConnectionHandle,
    control_tx: mpsc::UnboundedSender<Message>,
) {
    let mut ping_timer = interval(PING_INTERVAL);
    // Skip the first immediate tick
    ping_timer.tick().await;

    loop {
        ping_timer.tick().await;

        if !gateway.is_registered(handle.id()) {
            tracing::info!(connection_id = %handle.id(), "[Socket] Connection evicted, closing");
            let _ = control_tx.send(close_message(CLOSE_NORMAL, "Connection evicted"));
            break;
        }

        if control_tx.send(Message::Ping(vec![1, 2, 3, 4].into())).is_err() {
            // Writer task has died; connection is gone
            break;
        }
    }
}

/// Writer task: forwards control messages and queued frames to the sink.
///
/// Control messages win over queued frames. A close frame ends the task.
async fn writer_task(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut frames: mpsc::Receiver<ServerFrame>,
    mut control: mpsc::UnboundedReceiver<Message>,
) {
    loop {
        let msg = tokio::select! {
            biased;
            Some(msg) = control.recv() => msg,
            frame = frames.recv() => match frame {
                Some(frame) => match serde_json::to_string(&frame) {
                    Ok(json) => Message::Text(json.into()),
                    Err(e) => {
                        tracing::error!(kind = frame.kind(), error = %e, "[Socket] Failed to encode frame");
                        continue;
                    }
                },
                None => break,
            },
        };

        let is_close = matches!(msg, Message::Close(_));
        if ws_sender.send(msg).await.is_err() {
            // WebSocket send failed; connection is broken
            break;
        }
        if is_close {
            break;
        }
    }
    let _ = ws_sender.close().await;
}
