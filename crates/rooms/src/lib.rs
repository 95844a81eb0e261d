/// Lockstep Rooms Service
///
/// Keeps a room of viewers in lock-step on a shared video: one host drives
/// playback, everyone else mirrors it, chat and presence ride the same
/// connection.
///
/// Components:
/// - Room registry resolving room codes to live room actors
/// - One serialized actor per room (roster, playback authority, chat sequence)
/// - WebSocket session actors demultiplexing the client event channel
/// - REST surface for room lifecycle (create / join pre-check / snapshot)
pub mod chat;
pub mod playback;
pub mod presence;
pub mod protocol;
pub mod registry;
pub mod room;
pub mod server;
pub mod websocket;

pub use chat::ChatLog;
pub use playback::{PlaybackSnapshot, PlaybackState, PlaybackStatus};
pub use presence::{AttachOutcome, Participant, Roster};
pub use protocol::{ClientEvent, ControlAction, ParticipantSummary, ServerEvent};
pub use registry::RoomRegistry;
pub use room::{
    Attach, ConnectionId, ConnectionLost, Control, Detach, GetSnapshot, Outbound, RoomActor,
    RoomSnapshot, SendChat,
};
pub use server::start_server;
pub use websocket::RoomSocket;

/// Initialize tracing for the rooms service
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lockstep_rooms=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
