/// Wire protocol for the real-time room channel
///
/// One bidirectional JSON event stream per client. Event names and payload
/// shapes are part of the public contract with the web clients: kebab-case
/// `type` tags, camelCase fields.
use chrono::{DateTime, Utc};
use lockstep_core::LockstepError;
use serde::{Deserialize, Serialize};

use crate::playback::PlaybackSnapshot;

/// Playback control actions a host may issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Play,
    Pause,
    Seek,
}

/// Participant summary as seen by clients
///
/// `is_host` is derived server-side from the room's host id; it never
/// travels inbound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub id: String,
    pub username: String,
    pub is_anonymous: bool,
    pub is_host: bool,
}

/// Events sent by clients
///
/// Note the absence of any sender identity on `send-message`: the sender is
/// always resolved from the authenticated connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    JoinRoom {
        room_id: String,
    },

    LeaveRoom {
        room_id: String,
    },

    SendMessage {
        room_id: String,
        text: String,
    },

    VideoControl {
        room_id: String,
        action: ControlAction,
        current_time: f64,
    },
}

/// Events pushed to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Synchronous attach snapshot: full roster plus absolute playback state
    RoomJoined {
        room_id: String,
        playback: PlaybackSnapshot,
        participants: Vec<ParticipantSummary>,
    },

    ReceiveMessage {
        id: u64,
        sender: ParticipantSummary,
        text: String,
        sent_at: DateTime<Utc>,
    },

    UserJoined {
        participant: ParticipantSummary,
    },

    UserLeft {
        user_id: String,
    },

    Play {
        current_time: f64,
    },

    Pause {
        current_time: f64,
    },

    Seek {
        current_time: f64,
    },

    RoomError {
        kind: String,
        message: String,
    },
}

impl ServerEvent {
    /// Addressed error event carrying the shared error vocabulary
    pub fn error(err: &LockstepError) -> Self {
        ServerEvent::RoomError {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    /// Serialize to JSON text for WebSocket transmission
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
