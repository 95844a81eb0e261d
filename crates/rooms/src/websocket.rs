/// WebSocket session actor: one per client connection
///
/// Owns the connection handle, tracks liveness, and demultiplexes inbound
/// events to the room the connection is subscribed to. A connection belongs
/// to at most one room at a time.
use actix::{Actor, ActorContext, AsyncContext, Handler, StreamHandler};
use actix_web_actors::ws;
use lockstep_auth::Identity;
use lockstep_core::{LockstepError, RoomConfig};
use std::time::Instant;
use uuid::Uuid;

use crate::protocol::{ClientEvent, ServerEvent};
use crate::registry::RoomRegistry;
use crate::room::{Attach, ConnectionLost, ConnectionId, Control, Detach, RoomActor, SendChat, Outbound};

pub struct RoomSocket {
    conn_id: ConnectionId,
    identity: Identity,
    registry: RoomRegistry,
    config: RoomConfig,
    /// Room this connection is subscribed to, if any
    room: Option<(String, actix::Addr<RoomActor>)>,
    /// Last heartbeat timestamp
    hb: Instant,
}

impl RoomSocket {
    pub fn new(identity: Identity, registry: RoomRegistry, config: RoomConfig) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            identity,
            registry,
            config,
            room: None,
            hb: Instant::now(),
        }
    }

    /// Start heartbeat process
    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let timeout = self.config.client_timeout;
        ctx.run_interval(self.config.heartbeat_interval, move |act, ctx| {
            if Instant::now().duration_since(act.hb) > timeout {
                tracing::warn!(
                    "Client {} heartbeat timeout, disconnecting",
                    act.conn_id
                );
                ctx.stop();
                return;
            }

            ctx.ping(b"");
        });
    }

    fn send_error(&self, err: &LockstepError, ctx: &mut ws::WebsocketContext<Self>) {
        match ServerEvent::error(err).to_json() {
            Ok(json) => ctx.text(json),
            Err(e) => tracing::error!("Failed to serialize error event: {}", e),
        }
    }

    /// Resolve the subscribed room when it matches the event's room id
    fn subscribed_room(
        &self,
        room_id: &str,
    ) -> Result<actix::Addr<RoomActor>, LockstepError> {
        match &self.room {
            Some((current, addr)) if current == room_id => Ok(addr.clone()),
            Some(_) => Err(LockstepError::validation(
                "Connection is subscribed to a different room",
            )),
            None => Err(LockstepError::validation(
                "Connection is not subscribed to a room; send join-room first",
            )),
        }
    }

    fn join_room(&mut self, room_id: String, ctx: &mut ws::WebsocketContext<Self>) {
        if let Some((current, _)) = &self.room {
            if *current != room_id {
                self.send_error(
                    &LockstepError::validation(
                        "Connection is already subscribed to a room; send leave-room first",
                    ),
                    ctx,
                );
                return;
            }
            // Re-joining the same room just refreshes the snapshot
        }

        let Some(addr) = self.registry.get(&room_id) else {
            self.send_error(&LockstepError::NotFound(room_id), ctx);
            return;
        };

        addr.do_send(Attach {
            conn_id: self.conn_id,
            identity: self.identity.clone(),
            addr: ctx.address().recipient(),
        });
        self.room = Some((room_id, addr));
    }

    fn leave_room(&mut self, room_id: &str, ctx: &mut ws::WebsocketContext<Self>) {
        match self.subscribed_room(room_id) {
            Ok(addr) => {
                addr.do_send(Detach {
                    conn_id: self.conn_id,
                });
                self.room = None;
            }
            Err(e) => self.send_error(&e, ctx),
        }
    }

    fn handle_event(&mut self, event: ClientEvent, ctx: &mut ws::WebsocketContext<Self>) {
        match event {
            ClientEvent::JoinRoom { room_id } => self.join_room(room_id, ctx),
            ClientEvent::LeaveRoom { room_id } => self.leave_room(&room_id, ctx),
            ClientEvent::SendMessage { room_id, text } => match self.subscribed_room(&room_id) {
                Ok(addr) => addr.do_send(SendChat {
                    conn_id: self.conn_id,
                    text,
                }),
                Err(e) => self.send_error(&e, ctx),
            },
            ClientEvent::VideoControl {
                room_id,
                action,
                current_time,
            } => match self.subscribed_room(&room_id) {
                Ok(addr) => addr.do_send(Control {
                    conn_id: self.conn_id,
                    action,
                    current_time,
                }),
                Err(e) => self.send_error(&e, ctx),
            },
        }
    }
}

impl Actor for RoomSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(
            "Connection {} established for participant {}",
            self.conn_id,
            self.identity.id
        );
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        // Transport loss enters the room's grace path; explicit leave-room
        // has already cleared `room` by the time the actor stops
        if let Some((room_id, addr)) = self.room.take() {
            addr.do_send(ConnectionLost {
                conn_id: self.conn_id,
            });
            tracing::info!(
                "Connection {} to room {} closed for participant {}",
                self.conn_id,
                room_id,
                self.identity.id
            );
        } else {
            tracing::info!("Connection {} closed", self.conn_id);
        }
    }
}

/// Pushes room events to the client
impl Handler<Outbound> for RoomSocket {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for RoomSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => self.handle_event(event, ctx),
                Err(e) => {
                    self.send_error(
                        &LockstepError::validation(format!("Malformed event: {}", e)),
                        ctx,
                    );
                }
            },
            Ok(ws::Message::Binary(_)) => {
                self.send_error(
                    &LockstepError::validation("Binary messages are not supported"),
                    ctx,
                );
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!("Connection {} close received: {:?}", self.conn_id, reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                tracing::warn!("Continuation frames not supported");
            }
            Ok(ws::Message::Nop) => {}
            Err(e) => {
                tracing::error!("WebSocket protocol error on {}: {}", self.conn_id, e);
                ctx.stop();
            }
        }
    }
}
