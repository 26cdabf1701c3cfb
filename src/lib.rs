//! Match-scheduling engine for social racquet-sport events: round-by-round
//! generation of balanced matches over courts, minimizing repeated pairings.

pub mod logic;
pub mod models;

pub use logic::{
    decided_sides, eligible_participants, filtered_fixed_teams, generate_escalera_round,
    generate_random_round, generate_rating_round, generate_round, generate_season_round,
    generate_winners_court_round, matches_played, next_round, num_matches, team_rounds_played,
    HistoryIndex, RoundRequest, SeasonGroup,
};
pub use models::{
    team_key, Court, CourtId, FixedTeam, GameConfig, GameSeed, Gender, GenderMode,
    GenerationStrategy, Match, MatchId, PairKey, Participant, ParticipantStatus, PlayerId, Round,
    RoundId, ScheduleError, SeasonRules, SetScore, StandingEntry, WinnerRule,
};
