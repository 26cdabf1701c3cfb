//! Round, Match, and score-sheet data structures.

use crate::models::participant::PlayerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Unique identifier for a round.
pub type RoundId = Uuid;

/// Unique identifier for a court.
pub type CourtId = Uuid;

/// Score of one set: non-negative points per side. A set counts toward totals
/// only once either side has scored.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub team_a: u32,
    pub team_b: u32,
}

impl SetScore {
    pub fn is_scored(&self) -> bool {
        self.team_a > 0 || self.team_b > 0
    }
}

/// One A-vs-B contest between two teams of 1 or 2 players, with a score sheet.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub team_a: Vec<PlayerId>,
    pub team_b: Vec<PlayerId>,
    pub sets: Vec<SetScore>,
    pub court_id: Option<CourtId>,
}

impl Match {
    /// Create a match with `sets_per_match` zeroed sets (at least one).
    pub fn new(
        team_a: Vec<PlayerId>,
        team_b: Vec<PlayerId>,
        sets_per_match: usize,
        court_id: Option<CourtId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_a,
            team_b,
            sets: vec![SetScore::default(); sets_per_match.max(1)],
            court_id,
        }
    }

    /// Both sides populated; matches failing this are excluded from history counts.
    pub fn has_players(&self) -> bool {
        !self.team_a.is_empty() && !self.team_b.is_empty()
    }

    /// At least one set has a non-zero score on either side.
    pub fn is_played(&self) -> bool {
        self.sets.iter().any(SetScore::is_scored)
    }

    /// Aggregate (team_a, team_b) totals over scored sets only.
    pub fn score_totals(&self) -> (u32, u32) {
        self.sets
            .iter()
            .filter(|s| s.is_scored())
            .fold((0, 0), |(a, b), s| (a + s.team_a, b + s.team_b))
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.team_a.iter().chain(self.team_b.iter()).copied()
    }
}

/// One generation cycle: a batch of concurrent matches, mapped 1:1 to courts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub matches: Vec<Match>,
}

impl Round {
    pub fn new(matches: Vec<Match>) -> Self {
        Self {
            id: Uuid::new_v4(),
            matches,
        }
    }
}

/// Canonical key for an unordered player pair, used for teammate and opponent
/// history counts. Construction sorts the two ids so that (a, b) == (b, a).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PairKey(PlayerId, PlayerId);

impl PairKey {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn players(&self) -> (PlayerId, PlayerId) {
        (self.0, self.1)
    }
}

/// Canonical key for a whole team (2 or more players): the sorted member list.
pub fn team_key(players: &[PlayerId]) -> Vec<PlayerId> {
    let mut key = players.to_vec();
    key.sort();
    key
}
