//! Winners-court strategy: a deterministic king-of-the-court ladder, distinct
//! from the escalera module (no completeness gate, ties go to team A).

use crate::logic::eligibility::{eligible_participants, num_matches};
use crate::logic::history::decided_sides;
use crate::models::{CourtId, GameConfig, Match, Participant, PlayerId, Round};

/// Generate the next winners-court round.
///
/// Round 1 seeds courts by descending level (positions 0+2 vs 1+3 per block).
/// Later rounds promote each court's winner pair one court up and demote the
/// loser pair one court down: court 0 mixes its own winners with court 1's,
/// the bottom court mixes the two lowest loser pairs, and middle court i mixes
/// the losers from court i-1 with the winners from court i+1. Unscored sets
/// are ignored; a fully tied match counts as a team-A win. Every player is
/// placed exactly once.
pub fn generate_winners_court_round(
    config: &GameConfig,
    roster: &[Participant],
    rounds: &[Round],
) -> Vec<Match> {
    let participants = eligible_participants(roster, config.gender_mode);
    if participants.len() < 4 {
        return Vec::new();
    }
    let target = num_matches(config.num_courts(), &participants, config.gender_mode);
    if target == 0 {
        return Vec::new();
    }
    let courts = config.sorted_court_ids();

    let Some(previous) = rounds.last().filter(|r| !r.matches.is_empty()) else {
        return first_round(config, &participants, &courts, target);
    };

    // Winner/loser pairs per occupied court, top court first.
    let results: Vec<(Vec<PlayerId>, Vec<PlayerId>)> = previous
        .matches
        .iter()
        .filter(|m| m.has_players())
        .map(|m| {
            decided_sides(m).unwrap_or_else(|| (m.team_a.clone(), m.team_b.clone()))
        })
        .collect();
    if results.is_empty() {
        return Vec::new();
    }

    let k = results.len();
    let mut matches = Vec::new();
    for i in 0..k {
        let (high, low) = if k == 1 {
            // Single court: winners split across the two new teams.
            (&results[0].0, &results[0].1)
        } else if i == 0 {
            (&results[0].0, &results[1].0)
        } else if i == k - 1 {
            (&results[i - 1].1, &results[i].1)
        } else {
            (&results[i - 1].1, &results[i + 1].0)
        };
        if high.len() < 2 || low.len() < 2 {
            continue;
        }
        matches.push(Match::new(
            vec![high[0], low[0]],
            vec![high[1], low[1]],
            config.sets_per_match,
            courts.get(i).copied(),
        ));
        if matches.len() == target {
            break;
        }
    }
    matches
}

fn first_round(
    config: &GameConfig,
    participants: &[Participant],
    courts: &[CourtId],
    target: usize,
) -> Vec<Match> {
    let mut sorted = participants.to_vec();
    sorted.sort_by(|a, b| b.level.total_cmp(&a.level));
    let ids: Vec<PlayerId> = sorted.iter().map(|p| p.user_id).collect();

    let mut matches = Vec::new();
    for i in 0..target {
        let block = &ids[i * 4..];
        if block.len() < 4 {
            break;
        }
        matches.push(Match::new(
            vec![block[0], block[2]],
            vec![block[1], block[3]],
            config.sets_per_match,
            courts.get(i).copied(),
        ));
    }
    matches
}
