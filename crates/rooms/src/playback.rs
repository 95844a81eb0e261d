/// Authoritative playback state
///
/// One instance per room, mutated only by the room's serialized actor on
/// host commands. Position is a float offset in seconds, clamped at zero;
/// no upper bound is enforced here (media duration belongs to the player
/// surface, not the engine).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Paused,
    Playing,
}

/// Stored authoritative state
///
/// While `Playing`, the effective position at query time `t` is
/// `position_seconds + (t - as_of)`; while `Paused` it is constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub position_seconds: f64,
    pub as_of: DateTime<Utc>,
    pub last_command_source: String,
}

/// Absolute snapshot sent to attaching clients
///
/// Always carries the extrapolated position with `as_of = now`, never a
/// relative delta, so client clock skew cannot accumulate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub position_seconds: f64,
    pub as_of: DateTime<Utc>,
}

impl PlaybackState {
    /// Fresh state: paused at zero
    pub fn new(source: String, now: DateTime<Utc>) -> Self {
        Self {
            status: PlaybackStatus::Paused,
            position_seconds: 0.0,
            as_of: now,
            last_command_source: source,
        }
    }

    pub fn play(&mut self, time: f64, source: &str, now: DateTime<Utc>) {
        self.status = PlaybackStatus::Playing;
        self.set_position(time, source, now);
    }

    pub fn pause(&mut self, time: f64, source: &str, now: DateTime<Utc>) {
        self.status = PlaybackStatus::Paused;
        self.set_position(time, source, now);
    }

    /// Seek leaves the play/pause status unchanged
    pub fn seek(&mut self, time: f64, source: &str, now: DateTime<Utc>) {
        self.set_position(time, source, now);
    }

    fn set_position(&mut self, time: f64, source: &str, now: DateTime<Utc>) {
        self.position_seconds = time.max(0.0);
        self.as_of = now;
        self.last_command_source = source.to_string();
    }

    /// Position extrapolated to `now`
    pub fn effective_position(&self, now: DateTime<Utc>) -> f64 {
        match self.status {
            PlaybackStatus::Paused => self.position_seconds,
            PlaybackStatus::Playing => {
                let elapsed =
                    now.signed_duration_since(self.as_of).num_milliseconds() as f64 / 1000.0;
                (self.position_seconds + elapsed).max(0.0)
            }
        }
    }

    /// Absolute snapshot for late joiners and reconnects
    pub fn snapshot(&self, now: DateTime<Utc>) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status,
            position_seconds: self.effective_position(now),
            as_of: now,
        }
    }
}
