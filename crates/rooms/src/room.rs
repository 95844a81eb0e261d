/// Room actor: the serialized authority for one watch room
///
/// All mutation of a room's roster, playback state and chat sequence goes
/// through this actor's mailbox, so commands are applied and broadcast in
/// arrival order with no cross-room locking. Distinct rooms run fully
/// independently.
use actix::dev::MessageResult;
use actix::{
    Actor, ActorContext, AsyncContext, Context, Handler, Message as ActixMessage, Recipient,
    SpawnHandle,
};
use chrono::{DateTime, Utc};
use lockstep_auth::Identity;
use lockstep_core::{LockstepError, RoomConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::chat::ChatLog;
use crate::playback::{PlaybackSnapshot, PlaybackState, PlaybackStatus};
use crate::presence::{AttachOutcome, Roster};
use crate::protocol::{ControlAction, ParticipantSummary, ServerEvent};
use crate::registry::RoomRegistry;

/// Unique identifier for a client connection
pub type ConnectionId = Uuid;

/// Serialized server event pushed to one client connection
#[derive(Debug, Clone, ActixMessage)]
#[rtype(result = "()")]
pub struct Outbound(pub String);

/// Attach a connection to the room
#[derive(ActixMessage)]
#[rtype(result = "()")]
pub struct Attach {
    pub conn_id: ConnectionId,
    pub identity: Identity,
    pub addr: Recipient<Outbound>,
}

/// Explicit leave: releases the participant immediately
#[derive(Debug, ActixMessage)]
#[rtype(result = "()")]
pub struct Detach {
    pub conn_id: ConnectionId,
}

/// Transport loss: enters the grace window instead of leaving
#[derive(Debug, ActixMessage)]
#[rtype(result = "()")]
pub struct ConnectionLost {
    pub conn_id: ConnectionId,
}

/// Chat submission; the sender is resolved from the connection binding
#[derive(Debug, ActixMessage)]
#[rtype(result = "()")]
pub struct SendChat {
    pub conn_id: ConnectionId,
    pub text: String,
}

/// Playback command; only honored when the connection belongs to the host
#[derive(Debug, ActixMessage)]
#[rtype(result = "()")]
pub struct Control {
    pub conn_id: ConnectionId,
    pub action: ControlAction,
    pub current_time: f64,
}

/// Room state snapshot for the REST surface
#[derive(Debug, ActixMessage)]
#[rtype(result = "RoomSnapshot")]
pub struct GetSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub video_url: String,
    pub host_id: String,
    pub participants: Vec<ParticipantSummary>,
    pub playback: PlaybackSnapshot,
    pub created_at: DateTime<Utc>,
}

struct ConnectionEntry {
    participant_id: String,
    addr: Recipient<Outbound>,
}

pub struct RoomActor {
    room_id: String,
    video_url: String,
    title: Option<String>,
    host_id: String,
    created_at: DateTime<Utc>,
    config: RoomConfig,
    registry: RoomRegistry,
    roster: Roster,
    playback: PlaybackState,
    chat: ChatLog,
    connections: HashMap<ConnectionId, ConnectionEntry>,
    /// Pending removals for participants inside the grace window
    grace_timers: HashMap<String, SpawnHandle>,
    /// Pending retirement while the room is empty
    retire_timer: Option<SpawnHandle>,
}

impl RoomActor {
    pub fn new(
        room_id: String,
        video_url: String,
        title: Option<String>,
        host_id: String,
        config: RoomConfig,
        registry: RoomRegistry,
    ) -> Self {
        let now = Utc::now();
        Self {
            room_id,
            video_url,
            title,
            playback: PlaybackState::new(host_id.clone(), now),
            host_id,
            created_at: now,
            config,
            registry,
            roster: Roster::new(),
            chat: ChatLog::new(),
            connections: HashMap::new(),
            grace_timers: HashMap::new(),
            retire_timer: None,
        }
    }

    fn send_to_connection(&self, conn_id: ConnectionId, event: &ServerEvent) {
        let Some(entry) = self.connections.get(&conn_id) else {
            return;
        };
        match event.to_json() {
            Ok(json) => entry.addr.do_send(Outbound(json)),
            Err(e) => tracing::error!(
                "Failed to serialize event for room {}: {}",
                self.room_id,
                e
            ),
        }
    }

    /// Fan an event out to every attached connection, optionally excluding one
    fn broadcast(&self, event: &ServerEvent, exclude: Option<ConnectionId>) {
        let json = match event.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(
                    "Failed to serialize broadcast for room {}: {}",
                    self.room_id,
                    e
                );
                return;
            }
        };

        for (conn_id, entry) in &self.connections {
            if Some(*conn_id) == exclude {
                continue;
            }
            entry.addr.do_send(Outbound(json.clone()));
        }
    }

    fn send_error(&self, conn_id: ConnectionId, err: &LockstepError) {
        self.send_to_connection(conn_id, &ServerEvent::error(err));
    }

    fn cancel_grace_timer(&mut self, participant_id: &str, ctx: &mut Context<Self>) {
        if let Some(handle) = self.grace_timers.remove(participant_id) {
            ctx.cancel_future(handle);
        }
    }

    fn schedule_participant_removal(&mut self, participant_id: String, ctx: &mut Context<Self>) {
        self.cancel_grace_timer(&participant_id, ctx);

        let pid = participant_id.clone();
        let handle = ctx.run_later(self.config.grace_period, move |act, ctx| {
            act.grace_timers.remove(&pid);
            tracing::debug!(
                "Grace period expired for participant {} in room {}",
                pid,
                act.room_id
            );
            act.remove_participant(&pid, ctx);
        });
        self.grace_timers.insert(participant_id, handle);
    }

    fn remove_participant(&mut self, participant_id: &str, ctx: &mut Context<Self>) {
        if self.roster.remove(participant_id).is_none() {
            return;
        }

        self.broadcast(
            &ServerEvent::UserLeft {
                user_id: participant_id.to_string(),
            },
            None,
        );

        if participant_id == self.host_id {
            self.freeze_playback();
        }

        if self.roster.is_empty() {
            self.schedule_retirement(ctx);
        }
    }

    /// Host departed: pause at the effective position so every client halts
    /// at the same frame. The host id stays room metadata, so a returning
    /// host regains control.
    fn freeze_playback(&mut self) {
        if self.playback.status != PlaybackStatus::Playing {
            return;
        }

        let now = Utc::now();
        let position = self.playback.effective_position(now);
        let host_id = self.host_id.clone();
        self.playback.pause(position, &host_id, now);

        tracing::info!(
            "Host left room {}; playback frozen at {:.3}s",
            self.room_id,
            position
        );
        self.broadcast(
            &ServerEvent::Pause {
                current_time: position,
            },
            None,
        );
    }

    fn schedule_retirement(&mut self, ctx: &mut Context<Self>) {
        self.cancel_retirement(ctx);
        self.retire_timer = Some(ctx.run_later(self.config.grace_period, |act, ctx| {
            tracing::info!("Retiring empty room {}", act.room_id);
            act.registry.remove(&act.room_id);
            ctx.stop();
        }));
    }

    fn cancel_retirement(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.retire_timer.take() {
            ctx.cancel_future(handle);
        }
    }

    fn snapshot(&self, now: DateTime<Utc>) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id.clone(),
            title: self.title.clone(),
            video_url: self.video_url.clone(),
            host_id: self.host_id.clone(),
            participants: self.roster.summaries(&self.host_id),
            playback: self.playback.snapshot(now),
            created_at: self.created_at,
        }
    }
}

impl Actor for RoomActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("Room {} started (host {})", self.room_id, self.host_id);
        // Eligible for destruction until someone attaches
        self.schedule_retirement(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Room {} stopped", self.room_id);
    }
}

impl Handler<Attach> for RoomActor {
    type Result = ();

    fn handle(&mut self, msg: Attach, ctx: &mut Self::Context) -> Self::Result {
        let now = Utc::now();

        self.cancel_retirement(ctx);
        self.cancel_grace_timer(&msg.identity.id, ctx);

        let outcome = self.roster.attach(&msg.identity, msg.conn_id, now);
        if let AttachOutcome::Superseded(old_conn) = outcome {
            // The replaced socket leaves the fan-out set immediately
            self.connections.remove(&old_conn);
            tracing::debug!(
                "Connection {} superseded by {} for participant {} in room {}",
                old_conn,
                msg.conn_id,
                msg.identity.id,
                self.room_id
            );
        }

        self.connections.insert(
            msg.conn_id,
            ConnectionEntry {
                participant_id: msg.identity.id.clone(),
                addr: msg.addr,
            },
        );

        // The joiner gets the roster and absolute playback state synchronously
        self.send_to_connection(
            msg.conn_id,
            &ServerEvent::RoomJoined {
                room_id: self.room_id.clone(),
                playback: self.playback.snapshot(now),
                participants: self.roster.summaries(&self.host_id),
            },
        );

        // Everyone else hears about genuinely new participants only; grace
        // reconnects and superseded sockets stay silent
        if outcome == AttachOutcome::Joined {
            if let Some(participant) = self.roster.get(&msg.identity.id) {
                self.broadcast(
                    &ServerEvent::UserJoined {
                        participant: participant.summary(&self.host_id),
                    },
                    Some(msg.conn_id),
                );
            }
            tracing::info!(
                "Participant {} joined room {} ({} present)",
                msg.identity.id,
                self.room_id,
                self.roster.len()
            );
        }
    }
}

impl Handler<Detach> for RoomActor {
    type Result = ();

    fn handle(&mut self, msg: Detach, ctx: &mut Self::Context) -> Self::Result {
        let Some(entry) = self.connections.remove(&msg.conn_id) else {
            return;
        };

        let participant_id = entry.participant_id;
        self.cancel_grace_timer(&participant_id, ctx);
        tracing::info!(
            "Participant {} left room {}",
            participant_id,
            self.room_id
        );
        self.remove_participant(&participant_id, ctx);
    }
}

impl Handler<ConnectionLost> for RoomActor {
    type Result = ();

    fn handle(&mut self, msg: ConnectionLost, ctx: &mut Self::Context) -> Self::Result {
        let Some(entry) = self.connections.remove(&msg.conn_id) else {
            return;
        };

        if self.roster.disconnect(&entry.participant_id, msg.conn_id) {
            tracing::debug!(
                "Connection {} lost for participant {} in room {}; grace window started",
                msg.conn_id,
                entry.participant_id,
                self.room_id
            );
            self.schedule_participant_removal(entry.participant_id, ctx);
        }
    }
}

impl Handler<SendChat> for RoomActor {
    type Result = ();

    fn handle(&mut self, msg: SendChat, _ctx: &mut Self::Context) -> Self::Result {
        let now = Utc::now();

        // Sender identity comes from the connection binding, never the payload
        let Some(entry) = self.connections.get(&msg.conn_id) else {
            return;
        };
        let Some(sender) = self
            .roster
            .get(&entry.participant_id)
            .map(|p| p.summary(&self.host_id))
        else {
            return;
        };

        match self.chat.accept(&msg.text, self.config.max_message_len) {
            Ok((id, text)) => {
                // Fan out to every connection, the sender included: the
                // authoritative copy replaces any local echo
                self.broadcast(
                    &ServerEvent::ReceiveMessage {
                        id,
                        sender,
                        text,
                        sent_at: now,
                    },
                    None,
                );
            }
            Err(e) => self.send_error(msg.conn_id, &e),
        }
    }
}

impl Handler<Control> for RoomActor {
    type Result = ();

    fn handle(&mut self, msg: Control, _ctx: &mut Self::Context) -> Self::Result {
        let now = Utc::now();

        let Some(entry) = self.connections.get(&msg.conn_id) else {
            return;
        };

        if entry.participant_id != self.host_id {
            self.send_error(
                msg.conn_id,
                &LockstepError::Authorization(
                    "Only the host can control playback".to_string(),
                ),
            );
            return;
        }

        if !msg.current_time.is_finite() {
            self.send_error(
                msg.conn_id,
                &LockstepError::validation_field("currentTime must be a finite number", "currentTime"),
            );
            return;
        }

        let source = entry.participant_id.clone();
        match msg.action {
            ControlAction::Play => self.playback.play(msg.current_time, &source, now),
            ControlAction::Pause => self.playback.pause(msg.current_time, &source, now),
            ControlAction::Seek => self.playback.seek(msg.current_time, &source, now),
        }

        // Broadcast the clamped authoritative time to everyone but the host
        let current_time = self.playback.position_seconds;
        let event = match msg.action {
            ControlAction::Play => ServerEvent::Play { current_time },
            ControlAction::Pause => ServerEvent::Pause { current_time },
            ControlAction::Seek => ServerEvent::Seek { current_time },
        };
        self.broadcast(&event, Some(msg.conn_id));

        tracing::debug!(
            "Room {} playback {:?} at {:.3}s",
            self.room_id,
            msg.action,
            current_time
        );
    }
}

impl Handler<GetSnapshot> for RoomActor {
    type Result = MessageResult<GetSnapshot>;

    fn handle(&mut self, _msg: GetSnapshot, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.snapshot(Utc::now()))
    }
}
