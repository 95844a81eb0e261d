/// Per-room participant roster
///
/// Keyed by identity id so that disjoint connections for one identity
/// collapse to a single participant record. The roster itself is plain
/// state; grace-period timing lives in the room actor that owns it.
use chrono::{DateTime, Utc};
use lockstep_auth::Identity;
use std::collections::HashMap;
use uuid::Uuid;

use crate::protocol::ParticipantSummary;

#[derive(Debug, Clone)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    pub is_anonymous: bool,
    /// Current live connection; `None` while inside the disconnect grace window
    pub connection_id: Option<Uuid>,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn summary(&self, host_id: &str) -> ParticipantSummary {
        ParticipantSummary {
            id: self.id.clone(),
            username: self.display_name.clone(),
            is_anonymous: self.is_anonymous,
            is_host: self.id == host_id,
        }
    }
}

/// What an attach did to the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// First appearance of this identity: a join notification is due
    Joined,
    /// Identity was disconnected and returned within the grace window
    Reconnected,
    /// Identity already had a live connection; the old one is replaced
    Superseded(Uuid),
}

#[derive(Debug, Default)]
pub struct Roster {
    participants: HashMap<String, Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a connection to the identity's participant record, creating the
    /// record on first appearance.
    pub fn attach(
        &mut self,
        identity: &Identity,
        connection_id: Uuid,
        now: DateTime<Utc>,
    ) -> AttachOutcome {
        match self.participants.get_mut(&identity.id) {
            Some(participant) => {
                let outcome = match participant.connection_id.replace(connection_id) {
                    Some(old) => AttachOutcome::Superseded(old),
                    None => AttachOutcome::Reconnected,
                };
                participant.display_name = identity.username.clone();
                outcome
            }
            None => {
                self.participants.insert(
                    identity.id.clone(),
                    Participant {
                        id: identity.id.clone(),
                        display_name: identity.username.clone(),
                        is_anonymous: identity.is_anonymous,
                        connection_id: Some(connection_id),
                        joined_at: now,
                    },
                );
                AttachOutcome::Joined
            }
        }
    }

    /// Mark the participant's connection as lost, entering the grace window.
    ///
    /// Only clears when `connection_id` is still the participant's current
    /// connection; a loss notice from a superseded socket is ignored.
    pub fn disconnect(&mut self, participant_id: &str, connection_id: Uuid) -> bool {
        match self.participants.get_mut(participant_id) {
            Some(p) if p.connection_id == Some(connection_id) => {
                p.connection_id = None;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, participant_id: &str) -> Option<Participant> {
        self.participants.remove(participant_id)
    }

    pub fn get(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.get(participant_id)
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Roster summaries in stable join order
    pub fn summaries(&self, host_id: &str) -> Vec<ParticipantSummary> {
        let mut participants: Vec<&Participant> = self.participants.values().collect();
        participants.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.id.cmp(&b.id)));
        participants.iter().map(|p| p.summary(host_id)).collect()
    }
}
