/// Room registry: room code -> live room actor
///
/// Creates rooms on demand and resolves codes for attaching connections.
/// Rooms remove themselves after being empty past the grace period.
use actix::{Actor, Addr};
use dashmap::DashMap;
use lockstep_auth::Identity;
use lockstep_core::{validate_video_url, LockstepError, Result, RoomConfig};
use rand::Rng;
use std::sync::Arc;

use crate::room::{GetSnapshot, RoomActor, RoomSnapshot};

const ROOM_ID_LEN: usize = 8;
/// Unambiguous uppercase alphanumerics (no I/O/0/1): codes are read aloud
/// and copy/pasted between viewers
const ROOM_ID_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<String, Addr<RoomActor>>>,
    config: RoomConfig,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Create a room and start its actor
    ///
    /// The creator becomes the room's host; playback starts paused at zero.
    pub fn create_room(
        &self,
        video_url: &str,
        title: Option<String>,
        creator: &Identity,
    ) -> Result<String> {
        validate_video_url(video_url)?;

        let room_id = self.fresh_room_id();
        let actor = RoomActor::new(
            room_id.clone(),
            video_url.to_string(),
            title,
            creator.id.clone(),
            self.config.clone(),
            self.clone(),
        );
        let addr = actor.start();
        self.rooms.insert(room_id.clone(), addr);

        tracing::info!(
            "Created room {} for host {} ({} live rooms)",
            room_id,
            creator.id,
            self.rooms.len()
        );
        Ok(room_id)
    }

    /// Generate a fresh room code, re-rolling on collision with a live room
    fn fresh_room_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let code: String = (0..ROOM_ID_LEN)
                .map(|_| ROOM_ID_ALPHABET[rng.gen_range(0..ROOM_ID_ALPHABET.len())] as char)
                .collect();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    pub fn get(&self, room_id: &str) -> Option<Addr<RoomActor>> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Room state snapshot for the REST surface
    pub async fn snapshot(&self, room_id: &str) -> Result<RoomSnapshot> {
        let addr = self
            .get(room_id)
            .ok_or_else(|| LockstepError::NotFound(room_id.to_string()))?;

        addr.send(GetSnapshot)
            .await
            .map_err(|e| LockstepError::Internal(format!("Room {} unavailable: {}", room_id, e)))
    }

    /// Drop a room from the registry; invoked by retiring room actors
    pub fn remove(&self, room_id: &str) {
        if self.rooms.remove(room_id).is_some() {
            tracing::info!("Removed room {} ({} live rooms)", room_id, self.rooms.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str) -> Identity {
        Identity {
            id: id.to_string(),
            username: id.to_string(),
            is_anonymous: false,
        }
    }

    #[actix_rt::test]
    async fn test_create_room_generates_valid_code() {
        let registry = RoomRegistry::new(RoomConfig::default());
        let room_id = registry
            .create_room("https://example.com/movie.mp4", None, &identity("user-1"))
            .unwrap();

        assert_eq!(room_id.len(), ROOM_ID_LEN);
        assert!(room_id
            .bytes()
            .all(|b| ROOM_ID_ALPHABET.contains(&b)));
        assert!(registry.contains(&room_id));
        assert_eq!(registry.room_count(), 1);
    }

    #[actix_rt::test]
    async fn test_create_room_rejects_empty_video_url() {
        let registry = RoomRegistry::new(RoomConfig::default());
        let err = registry
            .create_room("", None, &identity("user-1"))
            .unwrap_err();
        assert_eq!(err.kind(), "validation_error");
        assert_eq!(registry.room_count(), 0);
    }

    #[actix_rt::test]
    async fn test_unknown_room_is_not_found() {
        let registry = RoomRegistry::new(RoomConfig::default());
        assert!(registry.get("NOSUCHRM").is_none());

        let err = registry.snapshot("NOSUCHRM").await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[actix_rt::test]
    async fn test_snapshot_reflects_creation_metadata() {
        let registry = RoomRegistry::new(RoomConfig::default());
        let room_id = registry
            .create_room(
                "https://example.com/movie.mp4",
                Some("Movie night".to_string()),
                &identity("host-1"),
            )
            .unwrap();

        let snapshot = registry.snapshot(&room_id).await.unwrap();
        assert_eq!(snapshot.room_id, room_id);
        assert_eq!(snapshot.video_url, "https://example.com/movie.mp4");
        assert_eq!(snapshot.title.as_deref(), Some("Movie night"));
        assert_eq!(snapshot.host_id, "host-1");
        assert!(snapshot.participants.is_empty());
    }
}
