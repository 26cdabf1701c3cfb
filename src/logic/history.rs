//! Derived statistics over prior rounds: play counts, teammate and opponent history.

use crate::models::{team_key, Match, PairKey, PlayerId, Round};
use std::collections::{HashMap, HashSet};

/// Pair-history counts derived from the supplied rounds. Built fresh per
/// generation call; holds no state beyond its inputs.
///
/// A match with an empty side (`has_players` false) is excluded from every
/// count. Counts increment once per round per co-occurrence.
#[derive(Clone, Debug, Default)]
pub struct HistoryIndex {
    /// Rounds in which the two players were on the same team.
    pub teammates: HashMap<PairKey, u32>,
    /// Rounds in which the two players faced each other.
    pub opponents: HashMap<PairKey, u32>,
    /// Teammate pairs of the most recent round only (soft exclusion for the
    /// next round: avoid an immediate repeat when alternatives exist).
    pub last_round_teammates: HashSet<PairKey>,
}

impl HistoryIndex {
    pub fn from_rounds(rounds: &[Round]) -> Self {
        let mut index = Self::default();

        for round in rounds {
            for m in round.matches.iter().filter(|m| m.has_players()) {
                record_teammates(&mut index.teammates, &m.team_a);
                record_teammates(&mut index.teammates, &m.team_b);
                for &a in &m.team_a {
                    for &b in &m.team_b {
                        *index.opponents.entry(PairKey::new(a, b)).or_insert(0) += 1;
                    }
                }
            }
        }

        if let Some(last) = rounds.last() {
            for m in last.matches.iter().filter(|m| m.has_players()) {
                for team in [&m.team_a, &m.team_b] {
                    if let Some(key) = pair_of(team) {
                        index.last_round_teammates.insert(key);
                    }
                }
            }
        }

        index
    }

    pub fn teammate_count(&self, key: PairKey) -> u32 {
        self.teammates.get(&key).copied().unwrap_or(0)
    }

    pub fn opponent_count(&self, key: PairKey) -> u32 {
        self.opponents.get(&key).copied().unwrap_or(0)
    }

    /// Summed opponent counts over the 4 cross-player pairs of a 2v2 matchup.
    pub fn matchup_score(&self, team_a: &[PlayerId], team_b: &[PlayerId]) -> u32 {
        let mut score = 0;
        for &a in team_a {
            for &b in team_b {
                score += self.opponent_count(PairKey::new(a, b));
            }
        }
        score
    }
}

fn record_teammates(counts: &mut HashMap<PairKey, u32>, team: &[PlayerId]) {
    if let Some(key) = pair_of(team) {
        *counts.entry(key).or_insert(0) += 1;
    }
}

fn pair_of(team: &[PlayerId]) -> Option<PairKey> {
    match team {
        [a, b, ..] => Some(PairKey::new(*a, *b)),
        _ => None,
    }
}

/// Per-player count of rounds in which they appeared in a match with both
/// sides populated. Ids absent from `player_ids` are ignored.
pub fn matches_played(player_ids: &[PlayerId], rounds: &[Round]) -> HashMap<PlayerId, u32> {
    let mut counts: HashMap<PlayerId, u32> = player_ids.iter().map(|&id| (id, 0)).collect();

    for round in rounds {
        for m in round.matches.iter().filter(|m| m.has_players()) {
            for id in m.players() {
                if let Some(c) = counts.get_mut(&id) {
                    *c += 1;
                }
            }
        }
    }

    counts
}

/// Per fixed team, the number of rounds in which any of its members appeared.
/// Keyed by the team's canonical (sorted) member list.
pub fn team_rounds_played(
    teams: &[Vec<PlayerId>],
    rounds: &[Round],
) -> HashMap<Vec<PlayerId>, u32> {
    let mut player_to_team: HashMap<PlayerId, Vec<PlayerId>> = HashMap::new();
    let mut counts: HashMap<Vec<PlayerId>, u32> = HashMap::new();
    for team in teams {
        let key = team_key(team);
        for &id in team {
            player_to_team.insert(id, key.clone());
        }
        counts.insert(key, 0);
    }

    for round in rounds {
        let mut counted: HashSet<Vec<PlayerId>> = HashSet::new();
        for m in round.matches.iter().filter(|m| m.has_players()) {
            for id in m.players() {
                if let Some(key) = player_to_team.get(&id) {
                    if counted.insert(key.clone()) {
                        *counts.entry(key.clone()).or_insert(0) += 1;
                    }
                }
            }
        }
    }

    counts
}

/// Determine winners and losers of a played match from aggregate scored-set
/// totals. `None` when the totals are equal (the caller decides tie policy).
pub fn decided_sides(m: &Match) -> Option<(Vec<PlayerId>, Vec<PlayerId>)> {
    let (a, b) = m.score_totals();
    if a > b {
        Some((m.team_a.clone(), m.team_b.clone()))
    } else if b > a {
        Some((m.team_b.clone(), m.team_a.clone()))
    } else {
        None
    }
}
