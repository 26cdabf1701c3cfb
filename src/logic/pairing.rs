//! History-aware pairing: teammate selection and matchup forming for the
//! Random and Fixed strategies.

use crate::logic::eligibility::{eligible_participants, filtered_fixed_teams, num_matches};
use crate::logic::history::{matches_played, HistoryIndex};
use crate::models::{
    FixedTeam, GameConfig, Gender, GenderMode, GenerationStrategy, Match, PairKey, Participant,
    PlayerId, Round,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Greedy pair-selection passes per candidate pool before widening to pairs
/// with a higher teammate-history count.
const PAIR_SELECTION_ATTEMPTS: usize = 20;

/// Randomized greedy runs when grouping pairs into matchups.
const MATCHUP_ATTEMPTS: usize = 10;

/// One candidate teammate pair (or configured fixed team) with its history count.
#[derive(Clone, Debug)]
struct PairCandidate {
    players: Vec<PlayerId>,
    key: PairKey,
    usage: u32,
}

/// Generate a round of history-aware matches: select teammate pairs preferring
/// the least-used combinations, then group pairs into matches minimizing
/// repeated opponents.
///
/// 1. Build the universe of legal pairs (fixed teams, cross-gender pairs for
///    MixPairs, or all combinations).
/// 2. Restrict to the lowest teammate-history count, avoiding last round's
///    pairs when alternatives exist; widen the pool only when selection
///    cannot fill the round.
/// 3. Greedily select pairs favoring players with the fewest rounds played.
/// 4. Group pairs into A-vs-B matches minimizing summed opponent history.
///
/// Returns an empty list (soft skip) when the pool cannot fill a single match.
pub fn generate_random_round(
    config: &GameConfig,
    roster: &[Participant],
    fixed_teams: &[FixedTeam],
    rounds: &[Round],
    rng: &mut impl Rng,
) -> Vec<Match> {
    let participants = eligible_participants(roster, config.gender_mode);
    let target = num_matches(config.num_courts(), &participants, config.gender_mode);
    if target == 0 {
        return Vec::new();
    }

    let history = HistoryIndex::from_rounds(rounds);

    let use_fixed = (config.strategy == GenerationStrategy::Fixed || config.has_fixed_teams)
        && !fixed_teams.is_empty();
    let universe = if use_fixed {
        let teams = filtered_fixed_teams(fixed_teams, roster, config.gender_mode);
        build_fixed_candidates(&teams, &history)
    } else {
        build_pair_candidates(&participants, config.gender_mode, &history)
    };
    if universe.is_empty() {
        return Vec::new();
    }

    let player_ids: Vec<PlayerId> = if use_fixed {
        universe.iter().flat_map(|c| c.players.iter().copied()).collect()
    } else {
        participants.iter().map(|p| p.user_id).collect()
    };
    let played = matches_played(&player_ids, rounds);

    let mut pairs = select_pairs(&universe, &player_ids, &played, &history, target * 2, rng);

    // An odd pair cannot form a match; bench the pair that has played the most.
    if pairs.len() % 2 == 1 {
        if let Some(drop) = pairs
            .iter()
            .enumerate()
            .max_by_key(|(_, p)| p.iter().map(|id| played.get(id).copied().unwrap_or(0)).sum::<u32>())
            .map(|(i, _)| i)
        {
            pairs.remove(drop);
        }
    }

    let matchups = form_matchups(&pairs, &history, target, rng);

    let courts = config.sorted_court_ids();
    matchups
        .into_iter()
        .enumerate()
        .map(|(i, (a, b))| {
            Match::new(
                pairs[a].clone(),
                pairs[b].clone(),
                config.sets_per_match,
                courts.get(i).copied(),
            )
        })
        .collect()
}

fn build_pair_candidates(
    participants: &[Participant],
    mode: GenderMode,
    history: &HistoryIndex,
) -> Vec<PairCandidate> {
    let mut candidates = Vec::new();

    if mode == GenderMode::MixPairs {
        let males: Vec<PlayerId> = ids_of_gender(participants, Gender::Male);
        let females: Vec<PlayerId> = ids_of_gender(participants, Gender::Female);
        for &m in &males {
            for &f in &females {
                let key = PairKey::new(m, f);
                candidates.push(PairCandidate {
                    players: vec![m, f],
                    key,
                    usage: history.teammate_count(key),
                });
            }
        }
    } else {
        let ids: Vec<PlayerId> = participants.iter().map(|p| p.user_id).collect();
        for i in 0..ids.len() {
            for j in i + 1..ids.len() {
                let key = PairKey::new(ids[i], ids[j]);
                candidates.push(PairCandidate {
                    players: vec![ids[i], ids[j]],
                    key,
                    usage: history.teammate_count(key),
                });
            }
        }
    }

    candidates
}

fn build_fixed_candidates(teams: &[Vec<PlayerId>], history: &HistoryIndex) -> Vec<PairCandidate> {
    teams
        .iter()
        .map(|team| {
            let key = PairKey::new(team[0], team[1]);
            PairCandidate {
                players: team.clone(),
                key,
                usage: history.teammate_count(key),
            }
        })
        .collect()
}

fn ids_of_gender(participants: &[Participant], gender: Gender) -> Vec<PlayerId> {
    participants
        .iter()
        .filter(|p| p.gender == gender)
        .map(|p| p.user_id)
        .collect()
}

/// Select up to `needed` disjoint pairs from the universe.
///
/// Pools are tried from the lowest teammate-history level upward; within the
/// first pool, last round's pairs are excluded when some other pair survives
/// the cut. Each pool gets bounded greedy passes with reshuffled tie-breaks;
/// the best (largest) selection wins. The last resort ignores history and
/// pairs players by ascending play count.
fn select_pairs(
    universe: &[PairCandidate],
    player_ids: &[PlayerId],
    played: &HashMap<PlayerId, u32>,
    history: &HistoryIndex,
    needed: usize,
    rng: &mut impl Rng,
) -> Vec<Vec<PlayerId>> {
    let mut levels: Vec<u32> = universe.iter().map(|c| c.usage).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pools: Vec<Vec<usize>> = Vec::new();
    let min_level_pool: Vec<usize> = indices_at_or_below(universe, levels[0]);
    let unrepeated: Vec<usize> = min_level_pool
        .iter()
        .copied()
        .filter(|&i| !history.last_round_teammates.contains(&universe[i].key))
        .collect();
    if !unrepeated.is_empty() && unrepeated.len() < min_level_pool.len() {
        pools.push(unrepeated);
    }
    pools.push(min_level_pool);
    for &level in &levels[1..] {
        pools.push(indices_at_or_below(universe, level));
    }

    let mut best: Vec<Vec<PlayerId>> = Vec::new();
    for (pool_idx, pool) in pools.iter().enumerate() {
        for _ in 0..PAIR_SELECTION_ATTEMPTS {
            let selected = greedy_pass(universe, pool, player_ids, played, rng);
            if selected.len() > best.len() {
                best = selected;
            }
            if best.len() >= needed {
                best.truncate(needed);
                return best;
            }
        }
        if pool_idx + 1 < pools.len() {
            log::debug!(
                "pair selection widening: pool {} of {} filled {}/{} pairs",
                pool_idx + 1,
                pools.len(),
                best.len(),
                needed
            );
        }
    }

    // Last resort: play-count order only, history ignored.
    let all: Vec<usize> = (0..universe.len()).collect();
    let fallback = greedy_pass(universe, &all, player_ids, played, rng);
    if fallback.len() > best.len() {
        log::debug!("pair selection fell back to play-count pairing ({} pairs)", fallback.len());
        best = fallback;
    }
    best.truncate(needed);
    best
}

fn indices_at_or_below(universe: &[PairCandidate], level: u32) -> Vec<usize> {
    universe
        .iter()
        .enumerate()
        .filter(|(_, c)| c.usage <= level)
        .map(|(i, _)| i)
        .collect()
}

/// One greedy selection pass: players in ascending play-count order (random
/// tie-break) each take their least-played available partner, tie-broken by
/// the pair's own teammate-history count. No player is used twice.
fn greedy_pass(
    universe: &[PairCandidate],
    pool: &[usize],
    player_ids: &[PlayerId],
    played: &HashMap<PlayerId, u32>,
    rng: &mut impl Rng,
) -> Vec<Vec<PlayerId>> {
    let mut by_player: HashMap<PlayerId, Vec<usize>> = HashMap::new();
    for &i in pool {
        for &id in &universe[i].players {
            by_player.entry(id).or_default().push(i);
        }
    }

    let mut ordered: Vec<(PlayerId, u32, u32)> = player_ids
        .iter()
        .map(|&id| (id, played.get(&id).copied().unwrap_or(0), rng.gen::<u32>()))
        .collect();
    ordered.sort_by_key(|&(_, plays, salt)| (plays, salt));

    let mut used: HashSet<PlayerId> = HashSet::new();
    let mut selected: Vec<Vec<PlayerId>> = Vec::new();

    for &(id, _, _) in &ordered {
        if used.contains(&id) {
            continue;
        }
        let Some(candidates) = by_player.get(&id) else {
            continue;
        };
        let choice = candidates
            .iter()
            .filter(|&&i| universe[i].players.iter().all(|p| *p == id || !used.contains(p)))
            .min_by_key(|&&i| {
                let partner_plays: u32 = universe[i]
                    .players
                    .iter()
                    .filter(|&&p| p != id)
                    .map(|p| played.get(p).copied().unwrap_or(0))
                    .max()
                    .unwrap_or(0);
                (partner_plays, universe[i].usage, rng.gen::<u32>())
            })
            .copied();
        if let Some(i) = choice {
            for &p in &universe[i].players {
                used.insert(p);
            }
            selected.push(universe[i].players.clone());
        }
    }

    selected
}

/// Group pairs into A-vs-B matchups minimizing the summed opponent-history
/// counts of the cross-player pairs. Bounded randomized greedy: the run
/// producing the most matchups wins, ties broken by the lower total score.
/// Shared with league season generation, where "pairs" are whole teams.
pub(crate) fn form_matchups(
    pairs: &[Vec<PlayerId>],
    history: &HistoryIndex,
    limit: usize,
    rng: &mut impl Rng,
) -> Vec<(usize, usize)> {
    if pairs.len() < 2 || limit == 0 {
        return Vec::new();
    }

    let mut best: Vec<(usize, usize)> = Vec::new();
    let mut best_score = u32::MAX;

    for _ in 0..MATCHUP_ATTEMPTS {
        let mut order: Vec<usize> = (0..pairs.len()).collect();
        order.shuffle(rng);

        let mut used = vec![false; pairs.len()];
        let mut run: Vec<(usize, usize)> = Vec::new();
        let mut run_score = 0u32;

        for &i in &order {
            if used[i] || run.len() >= limit {
                continue;
            }
            let opponent = order
                .iter()
                .filter(|&&j| j != i && !used[j])
                .min_by_key(|&&j| (history.matchup_score(&pairs[i], &pairs[j]), rng.gen::<u32>()))
                .copied();
            if let Some(j) = opponent {
                used[i] = true;
                used[j] = true;
                run_score += history.matchup_score(&pairs[i], &pairs[j]);
                run.push((i, j));
            }
        }

        if run.len() > best.len() || (run.len() == best.len() && run_score < best_score) {
            best = run;
            best_score = run_score;
        }
    }

    best
}
