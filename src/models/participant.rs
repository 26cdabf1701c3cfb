//! Participant and FixedTeam data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// Self-reported gender of a participant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    PreferNotToSay,
}

/// Whether a participant is available for match generation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    /// Confirmed and available for the next round.
    #[default]
    Playing,
    /// On the waiting list; not scheduled.
    Queued,
    /// Left the event; never scheduled.
    Left,
}

/// A participant of a game or league group, as resolved by the roster collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: PlayerId,
    pub gender: Gender,
    /// Skill level (platform rating scale, higher is stronger).
    pub level: f64,
    pub status: ParticipantStatus,
    pub is_trainer: bool,
}

impl Participant {
    /// Create a playing, non-trainer participant (the common roster entry).
    pub fn new(user_id: PlayerId, gender: Gender, level: f64) -> Self {
        Self {
            user_id,
            gender,
            level,
            status: ParticipantStatus::Playing,
            is_trainer: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == ParticipantStatus::Playing
    }
}

/// A persistent player pairing configured for the whole game or season,
/// as opposed to ad-hoc per-round pairing.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FixedTeam {
    pub team_number: u32,
    /// Member ids, ordered as configured (2 for pair play).
    pub players: Vec<PlayerId>,
}

impl FixedTeam {
    pub fn new(team_number: u32, players: Vec<PlayerId>) -> Self {
        Self { team_number, players }
    }
}
