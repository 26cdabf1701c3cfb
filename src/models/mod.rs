//! Data structures for the scheduling engine: participants, rounds, game config.

mod game;
mod participant;
mod round;
mod standings;

pub use game::{
    Court, GameConfig, GameSeed, GenderMode, GenerationStrategy, ScheduleError, SeasonRules,
    WinnerRule,
};
pub use participant::{FixedTeam, Gender, Participant, ParticipantStatus, PlayerId};
pub use round::{team_key, CourtId, Match, MatchId, PairKey, Round, RoundId, SetScore};
pub use standings::StandingEntry;
