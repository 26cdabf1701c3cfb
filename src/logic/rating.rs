//! Rating strategy: standings order seeds the courts; rank order, not
//! opponent history, is the fairness mechanism.

use crate::logic::eligibility::{
    eligible_participants, filtered_fixed_teams, num_matches, trim_teams_with_rotation,
    trim_with_rotation,
};
use crate::models::{
    FixedTeam, GameConfig, Match, Participant, PlayerId, Round, StandingEntry,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Generate the next rating round.
///
/// Round 1 shuffles the eligible pool. Later rounds follow the supplied
/// standings (fixed teams ranked by summed member score-delta), appending
/// eligible players or teams the standings do not know yet. An oversized pool
/// trims by fewest-rounds-played, preserving rank order among the kept.
/// Blocks of four play ranks 1,4 vs 2,3; fixed teams pair adjacent ranks.
pub fn generate_rating_round(
    config: &GameConfig,
    roster: &[Participant],
    fixed_teams: &[FixedTeam],
    standings: &[StandingEntry],
    rounds: &[Round],
    rng: &mut impl Rng,
) -> Vec<Match> {
    let participants = eligible_participants(roster, config.gender_mode);
    let target = num_matches(config.num_courts(), &participants, config.gender_mode);
    if target == 0 {
        return Vec::new();
    }
    let courts = config.sorted_court_ids();

    if config.has_fixed_teams && !fixed_teams.is_empty() {
        let teams = filtered_fixed_teams(fixed_teams, roster, config.gender_mode);
        if teams.len() < 2 {
            return Vec::new();
        }

        let mut ranked = teams;
        if rounds.is_empty() {
            ranked.shuffle(rng);
        } else {
            // Descending summed score-delta; unranked teams keep their
            // configured order at the end.
            let delta_of = |team: &[PlayerId]| -> Option<i64> {
                let deltas: Vec<i64> = team
                    .iter()
                    .filter_map(|id| {
                        standings.iter().find(|e| e.player == *id).map(|e| e.score_delta)
                    })
                    .collect();
                if deltas.is_empty() {
                    None
                } else {
                    Some(deltas.iter().sum())
                }
            };
            let mut scored: Vec<(usize, Option<i64>)> = ranked
                .iter()
                .enumerate()
                .map(|(i, team)| (i, delta_of(team)))
                .collect();
            scored.sort_by(|a, b| match (a.1, b.1) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.0.cmp(&b.0),
            });
            ranked = scored.into_iter().map(|(i, _)| ranked[i].clone()).collect();
        }

        let needed = target * 2;
        if ranked.len() > needed {
            ranked = trim_teams_with_rotation(&ranked, needed, rounds);
        }

        return (0..target.min(ranked.len() / 2))
            .map(|i| {
                Match::new(
                    ranked[i * 2].clone(),
                    ranked[i * 2 + 1].clone(),
                    config.sets_per_match,
                    courts.get(i).copied(),
                )
            })
            .collect();
    }

    let mut ids: Vec<PlayerId> = if rounds.is_empty() {
        let mut ids: Vec<PlayerId> = participants.iter().map(|p| p.user_id).collect();
        ids.shuffle(rng);
        ids
    } else {
        let eligible: HashSet<PlayerId> = participants.iter().map(|p| p.user_id).collect();
        let mut ranked: Vec<PlayerId> = standings
            .iter()
            .map(|e| e.player)
            .filter(|id| eligible.contains(id))
            .collect();
        let seen: HashSet<PlayerId> = ranked.iter().copied().collect();
        ranked.extend(
            participants
                .iter()
                .map(|p| p.user_id)
                .filter(|id| !seen.contains(id)),
        );
        ranked
    };

    let needed = target * 4;
    if ids.len() > needed {
        ids = trim_with_rotation(&ids, needed, rounds);
    }

    let mut matches = Vec::new();
    for i in 0..target {
        let block = &ids[i * 4..];
        if block.len() < 4 {
            break;
        }
        matches.push(Match::new(
            vec![block[0], block[3]],
            vec![block[1], block[2]],
            config.sets_per_match,
            courts.get(i).copied(),
        ));
    }
    matches
}
