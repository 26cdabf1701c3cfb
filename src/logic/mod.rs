//! Scheduling logic: history derivation, eligibility, and the round strategies.

mod eligibility;
mod generator;
mod history;
mod ladder;
mod pairing;
mod rating;
mod season;
mod winners_court;

pub use eligibility::{
    eligible_participants, filtered_fixed_teams, num_matches, trim_teams_with_rotation,
    trim_with_rotation, GROUP_SIZE,
};
pub use generator::{generate_round, next_round, RoundRequest};
pub use history::{decided_sides, matches_played, team_rounds_played, HistoryIndex};
pub use ladder::generate_escalera_round;
pub use pairing::generate_random_round;
pub use rating::generate_rating_round;
pub use season::{generate_season_round, SeasonGroup};
pub use winners_court::generate_winners_court_round;
