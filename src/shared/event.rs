/**
 * Socket Wire Frames
 *
 * This module defines the JSON frames exchanged over a live connection.
 * Frames are internally tagged by `type`:
 *
 * ```json
 * {"type":"send_message","to":"<uuid>","body":"hi"}
 * {"type":"presence","user_id":"<uuid>","state":"online"}
 * ```
 *
 * The byte-level encoding is left to the transport; the realtime core only
 * ever hands `ServerFrame` values to connection handles.
 */
use serde::{Deserialize, Serialize};

use crate::shared::message::{Message, UserId};

/// Online/offline state of a user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PresenceState {
    Online,
    Offline,
}

impl PresenceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

/// Frames sent by a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Send a direct message
    SendMessage { to: UserId, body: String },
    /// Typing indicator for a conversation
    Typing { to: UserId, is_typing: bool },
    /// Application-level keepalive
    Ping,
}

/// Frames pushed to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// A message addressed to this user
    NewMessage { message: Message },
    /// Acknowledgement to the socket that submitted a message
    MessageAccepted { message: Message },
    /// A peer went online or offline
    Presence { user_id: UserId, state: PresenceState },
    /// Interested peers that are online right now, sent once after connect
    PresenceSnapshot { online: Vec<UserId> },
    /// A peer started or stopped typing
    Typing { from: UserId, is_typing: bool },
    /// A client frame could not be processed
    Error { reason: String },
    Pong,
}

impl ServerFrame {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewMessage { .. } => "new_message",
            Self::MessageAccepted { .. } => "message_accepted",
            Self::Presence { .. } => "presence",
            Self::PresenceSnapshot { .. } => "presence_snapshot",
            Self::Typing { .. } => "typing",
            Self::Error { .. } => "error",
            Self::Pong => "pong",
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error {
            reason: reason.into(),
        }
    }
}
