//! Standings input consumed from the external standings calculator.

use crate::models::participant::PlayerId;
use serde::{Deserialize, Serialize};

/// One entry of a ranked standings table, best-placed first. The calculator
/// applies the game's winner-determination rule; the engine only consumes the
/// resulting order and score deltas.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub player: PlayerId,
    /// Points scored minus points conceded across the ranked scope.
    pub score_delta: i64,
}
