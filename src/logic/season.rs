//! League season team generation: per group, form teams that have never
//! played together this season and pair them into games.

use crate::logic::eligibility::eligible_participants;
use crate::logic::history::{matches_played, HistoryIndex};
use crate::logic::pairing::form_matchups;
use crate::models::{
    GameSeed, PairKey, Participant, PlayerId, Round, ScheduleError, SeasonRules,
};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Randomized team-selection passes before the deterministic fallback.
const TEAM_SELECTION_ATTEMPTS: usize = 10;

/// One league group's roster and season-to-date history, as resolved by the
/// caller. `season_rounds` spans every game of the group this season,
/// excluding the round currently being generated.
pub struct SeasonGroup<'a> {
    pub group_id: Uuid,
    pub roster: &'a [Participant],
    pub season_rounds: &'a [Round],
    pub rules: &'a SeasonRules,
    pub starts_at: DateTime<Utc>,
}

/// Generate one league round's games for a group.
///
/// Enumerates every teammate pair that has not yet played together this
/// season, selects a disjoint set covering the group (randomized greedy with
/// bounded retries, then a deterministic least-overlap pass), and pairs the
/// selected teams into games minimizing repeated opponent encounters. Each
/// pairing becomes a [`GameSeed`] inheriting the season's rules; the caller
/// persists them.
///
/// Fewer than 4 eligible participants skips the group (Ok, empty). An
/// exhausted pairing budget, an odd group size, or fewer than 2 selected
/// teams are hard errors; a selected team found in the played set is an
/// internal error, since the exclusion filter makes it impossible.
pub fn generate_season_round(
    group: &SeasonGroup<'_>,
    rng: &mut impl Rng,
) -> Result<Vec<GameSeed>, ScheduleError> {
    let participants = eligible_participants(group.roster, group.rules.gender_mode);
    if participants.len() < 4 {
        return Ok(Vec::new());
    }
    if participants.len() % 2 != 0 {
        return Err(ScheduleError::OddGroupSize { participants: participants.len() });
    }

    let ids: Vec<PlayerId> = participants.iter().map(|p| p.user_id).collect();
    let history = HistoryIndex::from_rounds(group.season_rounds);
    let played_teams: HashSet<PairKey> = history
        .teammates
        .iter()
        .filter(|entry| *entry.1 > 0)
        .map(|(&key, _)| key)
        .collect();

    let mut available: Vec<[PlayerId; 2]> = Vec::new();
    for i in 0..ids.len() {
        for j in i + 1..ids.len() {
            if !played_teams.contains(&PairKey::new(ids[i], ids[j])) {
                available.push([ids[i], ids[j]]);
            }
        }
    }
    if available.is_empty() {
        return Err(ScheduleError::SeasonPairingsExhausted);
    }

    let needed = ids.len() / 2;
    let played = matches_played(&ids, group.season_rounds);
    let selected = select_teams(&available, &ids, &played, needed, rng);

    for team in &selected {
        if played_teams.contains(&PairKey::new(team[0], team[1])) {
            return Err(ScheduleError::RepeatedTeamSelected { team: team.to_vec() });
        }
    }

    if selected.len() < 2 {
        return Err(ScheduleError::TooFewTeams { selected: selected.len() });
    }
    if selected.len() < needed {
        log::warn!(
            "group {}: only {}/{} fresh teams available this round",
            group.group_id,
            selected.len(),
            needed
        );
    }

    let teams: Vec<Vec<PlayerId>> = selected.iter().map(|t| t.to_vec()).collect();
    let matchups = form_matchups(&teams, &history, teams.len() / 2, rng);

    Ok(matchups
        .into_iter()
        .map(|(a, b)| {
            GameSeed::new(
                group.group_id,
                teams[a].clone(),
                teams[b].clone(),
                group.starts_at,
                group.rules.clone(),
            )
        })
        .collect())
}

/// Select up to `needed` disjoint teams from the available set: bounded
/// randomized greedy passes preferring the least-played players, then a
/// deterministic least-overlap pass when randomization under-fills.
fn select_teams(
    available: &[[PlayerId; 2]],
    ids: &[PlayerId],
    played: &HashMap<PlayerId, u32>,
    needed: usize,
    rng: &mut impl Rng,
) -> Vec<[PlayerId; 2]> {
    let mut by_player: HashMap<PlayerId, Vec<usize>> = HashMap::new();
    for (i, team) in available.iter().enumerate() {
        by_player.entry(team[0]).or_default().push(i);
        by_player.entry(team[1]).or_default().push(i);
    }

    let mut best: Vec<[PlayerId; 2]> = Vec::new();
    for _ in 0..TEAM_SELECTION_ATTEMPTS {
        let mut ordered: Vec<(PlayerId, u32, u32)> = ids
            .iter()
            .map(|&id| (id, played.get(&id).copied().unwrap_or(0), rng.gen::<u32>()))
            .collect();
        ordered.sort_by_key(|&(_, plays, salt)| (plays, salt));

        let mut used: HashSet<PlayerId> = HashSet::new();
        let mut pass: Vec<[PlayerId; 2]> = Vec::new();
        for &(id, _, _) in &ordered {
            if used.contains(&id) {
                continue;
            }
            let Some(candidates) = by_player.get(&id) else {
                continue;
            };
            // Partner choice is uniform: the randomization across passes is
            // what lets a pass escape a dead end a biased pick would repeat.
            let open: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&i| available[i].iter().all(|p| *p == id || !used.contains(p)))
                .collect();
            if let Some(&i) = open.choose(rng) {
                used.insert(available[i][0]);
                used.insert(available[i][1]);
                pass.push(available[i]);
            }
        }

        if pass.len() > best.len() {
            best = pass;
        }
        if best.len() >= needed {
            best.truncate(needed);
            return best;
        }
    }

    // Deterministic least-overlap fallback: candidates in enumeration order
    // (no player used yet sorts everything equal), greedily skipping teams
    // that touch an already-used player.
    log::debug!(
        "randomized team selection under-filled ({}/{}), trying least-overlap pass",
        best.len(),
        needed
    );
    let mut used: HashSet<PlayerId> = HashSet::new();
    let mut fallback: Vec<[PlayerId; 2]> = Vec::new();
    for team in available {
        if fallback.len() >= needed {
            break;
        }
        if used.contains(&team[0]) || used.contains(&team[1]) {
            continue;
        }
        used.insert(team[0]);
        used.insert(team[1]);
        fallback.push(*team);
    }

    if fallback.len() > best.len() {
        best = fallback;
    }
    best.truncate(needed);
    best
}
