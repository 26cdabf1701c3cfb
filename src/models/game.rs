//! Game configuration: strategy, gender policy, courts, and scheduling errors.

use crate::models::participant::PlayerId;
use crate::models::round::CourtId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during round or season generation.
///
/// Soft infeasibility (too few players, incomplete previous round) is never an
/// error: those cases yield an empty match list and the caller retries later.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScheduleError {
    /// Every possible teammate pair in the group has already played together
    /// this season; the season's pairing budget is exhausted.
    SeasonPairingsExhausted,
    /// Fewer than 2 teams could be formed, so no game can be paired.
    TooFewTeams { selected: usize },
    /// A league group has an odd number of participants; a remainder player
    /// cannot be absorbed mid-season.
    OddGroupSize { participants: usize },
    /// A selected team was already in the played set. The exclusion filter
    /// makes this impossible; reaching it means the fairness bookkeeping is
    /// corrupt and the round must not be persisted.
    RepeatedTeamSelected { team: Vec<PlayerId> },
}

impl ScheduleError {
    /// True for invariant violations (500-class); false for scheduling
    /// dead-ends a season admin can resolve (400-class).
    pub fn is_internal(&self) -> bool {
        matches!(self, ScheduleError::RepeatedTeamSelected { .. })
    }
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::SeasonPairingsExhausted => {
                write!(f, "All possible teams in this group have already played together")
            }
            ScheduleError::TooFewTeams { selected } => {
                write!(f, "Need at least 2 teams to pair a game (got {selected})")
            }
            ScheduleError::OddGroupSize { participants } => {
                write!(f, "Group must have an even number of participants (got {participants})")
            }
            ScheduleError::RepeatedTeamSelected { .. } => {
                write!(f, "Internal error: selected a team that already played together")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

/// How teams are composed for generated matches, gender-wise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderMode {
    /// No gender constraint.
    #[default]
    Any,
    /// Male players only.
    Men,
    /// Female players only.
    Women,
    /// Every team is one male and one female player.
    MixPairs,
    /// Mixed teams with no per-team requirement; undisclosed genders excluded.
    Mixed,
}

/// Which algorithm composes the next round.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStrategy {
    /// Organizer places players by hand; the engine returns the layout as-is.
    #[default]
    Handmade,
    /// Configured fixed teams rotate through the courts.
    Fixed,
    /// History-aware random pairing (minimize repeated teammates/opponents).
    Random,
    /// Standings order seeds the courts.
    Rating,
    /// Winners move toward the top court each round.
    WinnersCourt,
    RoundRobin,
    Escalera,
}

/// Winner-determination mode for standings, carried so league-generated games
/// inherit the season's rule. The standings themselves come from an external
/// calculator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinnerRule {
    #[default]
    ByMatchesWon,
    ByPoints,
    ByScoreDelta,
}

/// One bookable court. Matches are assigned to courts by ascending `order`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub order: u32,
}

/// Per-game generation settings, resolved by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub strategy: GenerationStrategy,
    pub gender_mode: GenderMode,
    pub courts: Vec<Court>,
    pub has_fixed_teams: bool,
    /// Number of sets each new match starts with (0 means flexible: one open set).
    pub sets_per_match: usize,
}

impl GameConfig {
    /// Court ids sorted by their configured order.
    pub fn sorted_court_ids(&self) -> Vec<CourtId> {
        let mut courts = self.courts.clone();
        courts.sort_by_key(|c| c.order);
        courts.into_iter().map(|c| c.id).collect()
    }

    /// Court count, defaulting to a single court when none are configured.
    pub fn num_courts(&self) -> usize {
        self.courts.len().max(1)
    }
}

/// Season-level rules inherited by every game a league round generates.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeasonRules {
    pub gender_mode: GenderMode,
    pub winner_rule: WinnerRule,
    pub sets_per_match: usize,
    /// Scheduled duration of each generated game.
    pub game_minutes: i64,
}

/// A league game to be persisted by the caller: two fixed teams playing under
/// the season's rules within the given window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSeed {
    pub group_id: Uuid,
    pub team_a: Vec<PlayerId>,
    pub team_b: Vec<PlayerId>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub rules: SeasonRules,
}

impl GameSeed {
    pub fn new(
        group_id: Uuid,
        team_a: Vec<PlayerId>,
        team_b: Vec<PlayerId>,
        starts_at: DateTime<Utc>,
        rules: SeasonRules,
    ) -> Self {
        let ends_at = starts_at + Duration::minutes(rules.game_minutes);
        Self {
            group_id,
            team_a,
            team_b,
            starts_at,
            ends_at,
            rules,
        }
    }
}
