//! Escalera (ladder) strategy: players move between ranked courts on win/loss
//! and form new cross-teams every round.

use crate::logic::eligibility::{
    eligible_participants, filtered_fixed_teams, num_matches, trim_teams_with_rotation,
    trim_with_rotation,
};
use crate::logic::history::{decided_sides, matches_played, team_rounds_played};
use crate::models::{
    team_key, CourtId, FixedTeam, GameConfig, Gender, GenderMode, Match, Participant, PlayerId,
    Round,
};
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Winners and losers of one court in the previous round, each in randomized
/// order so that who stays and who moves is not biased by team position.
struct CourtResult {
    winners: Vec<PlayerId>,
    losers: Vec<PlayerId>,
}

/// Court slots under reassembly; `None` marks a vacancy (departed player).
type CourtSlots = Vec<Vec<Option<PlayerId>>>;

/// Generate the next escalera round.
///
/// Round 1 seeds courts by descending level. From round 2 on, the previous
/// round must be complete (every populated match has a scored set); one winner
/// per court moves up, one loser moves down, the top court anchors both
/// winners and the bottom court both losers. Returns an empty list when the
/// previous round is not ready.
pub fn generate_escalera_round(
    config: &GameConfig,
    roster: &[Participant],
    fixed_teams: &[FixedTeam],
    rounds: &[Round],
    rng: &mut impl Rng,
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

    if config.has_fixed_teams && !fixed_teams.is_empty() {
        return fixed_team_round(config, roster, fixed_teams, rounds, &courts, target, rng);
    }
    if config.gender_mode == GenderMode::MixPairs {
        return mix_pairs_round(config, &participants, rounds, &courts, target, rng);
    }
    standard_round(config, &participants, rounds, &courts, target, rng)
}

/// Every populated match of the round has at least one scored set.
fn is_round_complete(round: &Round) -> bool {
    let mut populated = round.matches.iter().filter(|m| m.has_players()).peekable();
    if populated.peek().is_none() {
        return false;
    }
    populated.all(|m| m.is_played())
}

/// Per-court winners/losers of the previous round. Ties flip a coin; both
/// sides are then independently shuffled front-to-back.
fn court_results(previous: &Round, rng: &mut impl Rng) -> Vec<CourtResult> {
    let mut results = Vec::new();
    for m in previous.matches.iter().filter(|m| m.has_players()) {
        let (mut winners, mut losers) = match decided_sides(m) {
            Some(sides) => sides,
            None => {
                if rng.gen_bool(0.5) {
                    (m.team_a.clone(), m.team_b.clone())
                } else {
                    (m.team_b.clone(), m.team_a.clone())
                }
            }
        };
        if rng.gen_bool(0.5) {
            winners.reverse();
        }
        if rng.gen_bool(0.5) {
            losers.reverse();
        }
        results.push(CourtResult { winners, losers });
    }
    results
}

/// Move players between adjacent courts: new court i takes the down-mover
/// from above, its own stayers, and the up-mover from below; boundary courts
/// use only the defined neighbors (court 0 anchors both winners, the bottom
/// court both losers).
fn distribute_across_courts(results: &[CourtResult]) -> CourtSlots {
    let k = results.len();
    if k == 0 {
        return Vec::new();
    }
    if k == 1 {
        let r = &results[0];
        return vec![vec![
            r.winners.first().copied(),
            r.losers.first().copied(),
            r.winners.get(1).copied(),
            r.losers.get(1).copied(),
        ]];
    }

    let stay_w: Vec<_> = results.iter().map(|r| r.winners.first().copied()).collect();
    let move_w: Vec<_> = results.iter().map(|r| r.winners.get(1).copied()).collect();
    let stay_l: Vec<_> = results.iter().map(|r| r.losers.first().copied()).collect();
    let move_l: Vec<_> = results.iter().map(|r| r.losers.get(1).copied()).collect();

    (0..k)
        .map(|i| {
            if i == 0 {
                vec![stay_w[0], move_w[0], move_w[1], stay_l[0]]
            } else if i == k - 1 {
                vec![move_l[i - 1], stay_w[i], stay_l[i], move_l[i]]
            } else {
                vec![move_l[i - 1], stay_w[i], stay_l[i], move_w[i + 1]]
            }
        })
        .collect()
}

/// Clear slots held by players no longer eligible.
fn remove_departed(courts: &mut CourtSlots, eligible: &HashSet<PlayerId>) {
    for court in courts.iter_mut() {
        for slot in court.iter_mut() {
            if matches!(*slot, Some(id) if !eligible.contains(&id)) {
                *slot = None;
            }
        }
    }
}

fn active_players(courts: &CourtSlots) -> Vec<PlayerId> {
    courts.iter().flatten().filter_map(|s| *s).collect()
}

/// Fill vacancies from the bench (fewest rounds played first); any bench
/// player still waiting swaps into the lowest court holding someone with a
/// strictly higher play count.
fn rotate_bench(
    courts: &mut CourtSlots,
    bench: Vec<PlayerId>,
    rounds: &[Round],
) {
    let mut all: Vec<PlayerId> = active_players(courts);
    all.extend(bench.iter().copied());
    let played = matches_played(&all, rounds);

    let mut bench_sorted = bench;
    bench_sorted.sort_by_key(|id| played.get(id).copied().unwrap_or(0));
    let mut bench_iter = bench_sorted.into_iter();

    for court in courts.iter_mut() {
        for slot in court.iter_mut() {
            if slot.is_none() {
                if let Some(id) = bench_iter.next() {
                    *slot = Some(id);
                }
            }
        }
    }

    let remaining: Vec<PlayerId> = bench_iter.collect();
    if remaining.is_empty() {
        return;
    }

    // Bottom-court-first, highest play count first.
    let mut candidates: Vec<(usize, usize, u32)> = Vec::new();
    for (c, court) in courts.iter().enumerate() {
        for (p, slot) in court.iter().enumerate() {
            if let Some(id) = slot {
                candidates.push((c, p, played.get(id).copied().unwrap_or(0)));
            }
        }
    }
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then(b.2.cmp(&a.2)));

    for (bench_player, &(c, p, plays)) in remaining.iter().zip(candidates.iter()) {
        let bench_plays = played.get(bench_player).copied().unwrap_or(0);
        if bench_plays >= plays {
            continue;
        }
        log::debug!("bench rotation: swapping into court {c} slot {p}");
        courts[c][p] = Some(*bench_player);
    }
}

/// Matches from reassembled courts: positions 0+3 vs 1+2. Courts left with
/// fewer than 4 players are skipped.
fn matches_from_courts(
    courts: &CourtSlots,
    court_ids: &[CourtId],
    sets_per_match: usize,
    limit: usize,
) -> Vec<Match> {
    let mut matches = Vec::new();
    for (i, court) in courts.iter().enumerate().take(limit) {
        let players: Vec<PlayerId> = court.iter().filter_map(|s| *s).collect();
        if players.len() < 4 {
            continue;
        }
        matches.push(Match::new(
            vec![players[0], players[3]],
            vec![players[1], players[2]],
            sets_per_match,
            court_ids.get(i).copied(),
        ));
    }
    matches
}

// ── Standard (no fixed teams, no MixPairs) ─────────────────────────────

fn standard_round(
    config: &GameConfig,
    participants: &[Participant],
    rounds: &[Round],
    court_ids: &[CourtId],
    target: usize,
    rng: &mut impl Rng,
) -> Vec<Match> {
    if rounds.is_empty() {
        let mut sorted = participants.to_vec();
        sorted.sort_by(|a, b| b.level.total_cmp(&a.level));
        let mut ids: Vec<PlayerId> = sorted.iter().map(|p| p.user_id).collect();
        let needed = target * 4;
        if ids.len() > needed {
            ids = trim_with_rotation(&ids, needed, rounds);
        }
        return first_round_matches(&ids, court_ids, config.sets_per_match, target);
    }

    let previous = match rounds.last() {
        Some(r) if !r.matches.is_empty() => r,
        _ => return Vec::new(),
    };
    if !is_round_complete(previous) {
        return Vec::new();
    }

    let results = court_results(previous, rng);
    if results.is_empty() {
        return Vec::new();
    }

    let mut courts = distribute_across_courts(&results);
    let eligible: HashSet<PlayerId> = participants.iter().map(|p| p.user_id).collect();
    remove_departed(&mut courts, &eligible);

    let active: HashSet<PlayerId> = active_players(&courts).into_iter().collect();
    let bench: Vec<PlayerId> = participants
        .iter()
        .map(|p| p.user_id)
        .filter(|id| !active.contains(id))
        .collect();

    if !bench.is_empty() || courts.iter().flatten().any(|s| s.is_none()) {
        rotate_bench(&mut courts, bench, rounds);
    }

    matches_from_courts(&courts, court_ids, config.sets_per_match, target)
}

/// Seed courts top-down from a ranked id list, blocks of 4, cross-teams.
fn first_round_matches(
    ids: &[PlayerId],
    court_ids: &[CourtId],
    sets_per_match: usize,
    target: usize,
) -> Vec<Match> {
    let mut matches = Vec::new();
    for i in 0..target {
        let block = &ids[i * 4..];
        if block.len() < 4 {
            break;
        }
        matches.push(Match::new(
            vec![block[0], block[3]],
            vec![block[1], block[2]],
            sets_per_match,
            court_ids.get(i).copied(),
        ));
    }
    matches
}

// ── MixPairs ───────────────────────────────────────────────────────────

fn mix_pairs_round(
    config: &GameConfig,
    participants: &[Participant],
    rounds: &[Round],
    court_ids: &[CourtId],
    target: usize,
    rng: &mut impl Rng,
) -> Vec<Match> {
    let genders: HashMap<PlayerId, Gender> =
        participants.iter().map(|p| (p.user_id, p.gender)).collect();

    if rounds.is_empty() {
        return mix_pairs_first_round(config, participants, rounds, court_ids, target);
    }

    let previous = match rounds.last() {
        Some(r) if !r.matches.is_empty() => r,
        _ => return Vec::new(),
    };
    if !is_round_complete(previous) {
        return Vec::new();
    }

    let results = court_results(previous, rng);
    if results.is_empty() {
        return Vec::new();
    }

    let mut courts = distribute_across_courts(&results);
    rebalance_genders(&mut courts, &genders);

    let eligible: HashSet<PlayerId> = participants.iter().map(|p| p.user_id).collect();
    remove_departed(&mut courts, &eligible);

    let active: HashSet<PlayerId> = active_players(&courts).into_iter().collect();
    let bench: Vec<PlayerId> = participants
        .iter()
        .map(|p| p.user_id)
        .filter(|id| !active.contains(id))
        .collect();

    if !bench.is_empty() || courts.iter().flatten().any(|s| s.is_none()) {
        let mut all: Vec<PlayerId> = active_players(&courts);
        all.extend(bench.iter().copied());
        let played = matches_played(&all, rounds);

        let mut bench_males: Vec<PlayerId> = bench
            .iter()
            .copied()
            .filter(|id| genders.get(id) == Some(&Gender::Male))
            .collect();
        let mut bench_females: Vec<PlayerId> = bench
            .iter()
            .copied()
            .filter(|id| genders.get(id) == Some(&Gender::Female))
            .collect();
        bench_males.sort_by_key(|id| played.get(id).copied().unwrap_or(0));
        bench_females.sort_by_key(|id| played.get(id).copied().unwrap_or(0));

        fill_vacancies_by_gender(&mut courts, &mut bench_males, &mut bench_females, &genders);

        let remaining: Vec<PlayerId> =
            bench_males.into_iter().chain(bench_females).collect();
        if !remaining.is_empty() {
            swap_bench_by_gender(&mut courts, &remaining, &played, &genders);
        }
    }

    mix_matches_from_courts(&courts, court_ids, config.sets_per_match, target, &genders)
}

fn mix_pairs_first_round(
    config: &GameConfig,
    participants: &[Participant],
    rounds: &[Round],
    court_ids: &[CourtId],
    target: usize,
) -> Vec<Match> {
    let mut males: Vec<&Participant> =
        participants.iter().filter(|p| p.gender == Gender::Male).collect();
    let mut females: Vec<&Participant> =
        participants.iter().filter(|p| p.gender == Gender::Female).collect();
    males.sort_by(|a, b| b.level.total_cmp(&a.level));
    females.sort_by(|a, b| b.level.total_cmp(&a.level));

    let mut male_ids: Vec<PlayerId> = males.iter().map(|p| p.user_id).collect();
    let mut female_ids: Vec<PlayerId> = females.iter().map(|p| p.user_id).collect();

    let needed_per_gender = target * 2;
    if male_ids.len() > needed_per_gender {
        male_ids = trim_with_rotation(&male_ids, needed_per_gender, rounds);
    }
    if female_ids.len() > needed_per_gender {
        female_ids = trim_with_rotation(&female_ids, needed_per_gender, rounds);
    }

    let actual = target.min(male_ids.len() / 2).min(female_ids.len() / 2);
    (0..actual)
        .map(|i| {
            Match::new(
                vec![male_ids[i * 2], female_ids[i * 2 + 1]],
                vec![male_ids[i * 2 + 1], female_ids[i * 2]],
                config.sets_per_match,
                court_ids.get(i).copied(),
            )
        })
        .collect()
}

fn gender_count(court: &[Option<PlayerId>], genders: &HashMap<PlayerId, Gender>, g: Gender) -> usize {
    court
        .iter()
        .flatten()
        .filter(|&id| genders.get(id) == Some(&g))
        .count()
}

/// Swap same-gender occupants between courts until every court holds at most
/// 2 of each gender, preferring the nearest donor court. Bounded by courts².
fn rebalance_genders(courts: &mut CourtSlots, genders: &HashMap<PlayerId, Gender>) {
    let k = courts.len();
    let mut budget = k * k;

    while budget > 0 {
        budget -= 1;

        let imbalance = courts.iter().enumerate().find_map(|(c, court)| {
            if gender_count(court, genders, Gender::Male) > 2 {
                Some((c, Gender::Male))
            } else if gender_count(court, genders, Gender::Female) > 2 {
                Some((c, Gender::Female))
            } else {
                None
            }
        });
        let Some((over, excess)) = imbalance else {
            return;
        };
        let needed = if excess == Gender::Male { Gender::Female } else { Gender::Male };

        let donor = (0..k)
            .filter(|&c| c != over && gender_count(&courts[c], genders, needed) > 2)
            .min_by_key(|&c| c.abs_diff(over));
        let Some(donor) = donor else {
            return;
        };

        let from = courts[over]
            .iter()
            .rposition(|s| matches!(s, Some(id) if genders.get(id) == Some(&excess)));
        let to = courts[donor]
            .iter()
            .rposition(|s| matches!(s, Some(id) if genders.get(id) == Some(&needed)));
        let (Some(from), Some(to)) = (from, to) else {
            return;
        };

        let tmp = courts[over][from];
        courts[over][from] = courts[donor][to];
        courts[donor][to] = tmp;
    }
}

/// Fill vacancies preferring the gender the court is short of.
fn fill_vacancies_by_gender(
    courts: &mut CourtSlots,
    bench_males: &mut Vec<PlayerId>,
    bench_females: &mut Vec<PlayerId>,
    genders: &HashMap<PlayerId, Gender>,
) {
    for court in courts.iter_mut() {
        for p in 0..court.len() {
            if court[p].is_some() {
                continue;
            }
            let males = gender_count(court, genders, Gender::Male);
            let females = gender_count(court, genders, Gender::Female);
            court[p] = if males < females && !bench_males.is_empty() {
                Some(bench_males.remove(0))
            } else if !bench_females.is_empty() {
                Some(bench_females.remove(0))
            } else if !bench_males.is_empty() {
                Some(bench_males.remove(0))
            } else {
                None
            };
        }
    }
}

/// Gender-aware variant of the bench swap: a waiting bench player replaces a
/// same-gender occupant of the lowest court who has played strictly more.
fn swap_bench_by_gender(
    courts: &mut CourtSlots,
    bench: &[PlayerId],
    played: &HashMap<PlayerId, u32>,
    genders: &HashMap<PlayerId, Gender>,
) {
    for gender in [Gender::Male, Gender::Female] {
        let waiting: Vec<PlayerId> = bench
            .iter()
            .copied()
            .filter(|id| genders.get(id) == Some(&gender))
            .collect();
        if waiting.is_empty() {
            continue;
        }

        let mut candidates: Vec<(usize, usize, u32)> = Vec::new();
        for (c, court) in courts.iter().enumerate() {
            for (p, slot) in court.iter().enumerate() {
                if let Some(id) = slot {
                    if genders.get(id) == Some(&gender) {
                        candidates.push((c, p, played.get(id).copied().unwrap_or(0)));
                    }
                }
            }
        }
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(b.2.cmp(&a.2)));

        for (bench_player, &(c, p, plays)) in waiting.iter().zip(candidates.iter()) {
            let bench_plays = played.get(bench_player).copied().unwrap_or(0);
            if bench_plays >= plays {
                continue;
            }
            courts[c][p] = Some(*bench_player);
        }
    }
}

/// Cross-gender teams per court: m1+f2 vs m2+f1, falling back to positional
/// cross-teams when a court could not be balanced.
fn mix_matches_from_courts(
    courts: &CourtSlots,
    court_ids: &[CourtId],
    sets_per_match: usize,
    limit: usize,
    genders: &HashMap<PlayerId, Gender>,
) -> Vec<Match> {
    let mut matches = Vec::new();
    for (i, court) in courts.iter().enumerate().take(limit) {
        let players: Vec<PlayerId> = court.iter().filter_map(|s| *s).collect();
        if players.len() < 4 {
            continue;
        }
        let males: Vec<PlayerId> = players
            .iter()
            .copied()
            .filter(|id| genders.get(id) == Some(&Gender::Male))
            .collect();
        let females: Vec<PlayerId> = players
            .iter()
            .copied()
            .filter(|id| genders.get(id) == Some(&Gender::Female))
            .collect();

        let (team_a, team_b) = if males.len() >= 2 && females.len() >= 2 {
            (vec![males[0], females[1]], vec![males[1], females[0]])
        } else {
            (vec![players[0], players[3]], vec![players[1], players[2]])
        };
        matches.push(Match::new(team_a, team_b, sets_per_match, court_ids.get(i).copied()));
    }
    matches
}

// ── Fixed teams ────────────────────────────────────────────────────────

fn fixed_team_round(
    config: &GameConfig,
    roster: &[Participant],
    fixed_teams: &[FixedTeam],
    rounds: &[Round],
    court_ids: &[CourtId],
    target: usize,
    rng: &mut impl Rng,
) -> Vec<Match> {
    let teams = filtered_fixed_teams(fixed_teams, roster, config.gender_mode);
    if teams.len() < 2 {
        return Vec::new();
    }

    if rounds.is_empty() {
        let mut by_level: Vec<(Vec<PlayerId>, f64)> = teams
            .iter()
            .map(|team| (team.clone(), team_average_level(team, roster)))
            .collect();
        by_level.sort_by(|a, b| b.1.total_cmp(&a.1));
        let mut ranked: Vec<Vec<PlayerId>> = by_level.into_iter().map(|(t, _)| t).collect();

        let needed = target * 2;
        if ranked.len() > needed {
            ranked = trim_teams_with_rotation(&ranked, needed, rounds);
        }
        return adjacent_team_matches(&ranked, court_ids, config.sets_per_match, target);
    }

    let previous = match rounds.last() {
        Some(r) if !r.matches.is_empty() => r,
        _ => return Vec::new(),
    };
    if !is_round_complete(previous) {
        return Vec::new();
    }

    let eligible: HashSet<PlayerId> = eligible_participants(roster, GenderMode::Any)
        .iter()
        .map(|p| p.user_id)
        .collect();
    let by_player: HashMap<PlayerId, Vec<PlayerId>> = teams
        .iter()
        .flat_map(|team| team.iter().map(move |&id| (id, team.clone())))
        .collect();

    // Team-level court results: ties flip a coin; teams with departed members drop out.
    let mut results: Vec<(Vec<PlayerId>, Vec<PlayerId>)> = Vec::new();
    for m in previous.matches.iter().filter(|m| m.has_players()) {
        let (winner_side, loser_side) = match decided_sides(m) {
            Some(sides) => sides,
            None => {
                if rng.gen_bool(0.5) {
                    (m.team_a.clone(), m.team_b.clone())
                } else {
                    (m.team_b.clone(), m.team_a.clone())
                }
            }
        };
        let winner = by_player.get(&winner_side[0]).cloned().unwrap_or(winner_side);
        let loser = by_player.get(&loser_side[0]).cloned().unwrap_or(loser_side);
        if !winner.iter().all(|id| eligible.contains(id)) {
            continue;
        }
        if !loser.iter().all(|id| eligible.contains(id)) {
            continue;
        }
        results.push((winner, loser));
    }
    if results.is_empty() {
        return Vec::new();
    }

    // Same movement skeleton at team granularity: winners up, losers down,
    // boundary courts anchored.
    let k = results.len();
    let mut pairings: Vec<(Vec<PlayerId>, Vec<PlayerId>)> = Vec::new();
    if k == 1 {
        pairings.push(results[0].clone());
    } else {
        for i in 0..k {
            if i == 0 {
                pairings.push((results[0].0.clone(), results[1].0.clone()));
            } else if i == k - 1 {
                pairings.push((results[i - 1].1.clone(), results[i].1.clone()));
            } else {
                pairings.push((results[i - 1].1.clone(), results[i + 1].0.clone()));
            }
        }
    }

    rotate_bench_teams(&mut pairings, &teams, rounds);

    pairings
        .into_iter()
        .take(target)
        .enumerate()
        .map(|(i, (a, b))| Match::new(a, b, config.sets_per_match, court_ids.get(i).copied()))
        .collect()
}

fn team_average_level(team: &[PlayerId], roster: &[Participant]) -> f64 {
    let levels: Vec<f64> = roster
        .iter()
        .filter(|p| team.contains(&p.user_id))
        .map(|p| p.level)
        .collect();
    if levels.is_empty() {
        return 0.0;
    }
    levels.iter().sum::<f64>() / levels.len() as f64
}

fn adjacent_team_matches(
    ranked: &[Vec<PlayerId>],
    court_ids: &[CourtId],
    sets_per_match: usize,
    target: usize,
) -> Vec<Match> {
    (0..target.min(ranked.len() / 2))
        .map(|i| {
            Match::new(
                ranked[i * 2].clone(),
                ranked[i * 2 + 1].clone(),
                sets_per_match,
                court_ids.get(i).copied(),
            )
        })
        .collect()
}

/// Benched teams with fewer rounds played replace the most-played teams in
/// the lowest pairings, bottom-court-first.
fn rotate_bench_teams(
    pairings: &mut [(Vec<PlayerId>, Vec<PlayerId>)],
    teams: &[Vec<PlayerId>],
    rounds: &[Round],
) {
    let active: HashSet<Vec<PlayerId>> = pairings
        .iter()
        .flat_map(|(a, b)| [team_key(a), team_key(b)])
        .collect();
    let bench: Vec<&Vec<PlayerId>> =
        teams.iter().filter(|t| !active.contains(&team_key(t))).collect();
    if bench.is_empty() {
        return;
    }

    let played = team_rounds_played(teams, rounds);
    let plays_of = |team: &[PlayerId]| played.get(&team_key(team)).copied().unwrap_or(0);

    let mut bench_sorted = bench;
    bench_sorted.sort_by_key(|t| plays_of(t));

    // (pairing index, side) slots, bottom pairing first, most-played first.
    let mut slots: Vec<(usize, bool, u32)> = Vec::new();
    for (i, (a, b)) in pairings.iter().enumerate() {
        slots.push((i, false, plays_of(b)));
        slots.push((i, true, plays_of(a)));
    }
    slots.sort_by(|x, y| y.0.cmp(&x.0).then(y.2.cmp(&x.2)));

    for (bench_team, &(i, is_a, plays)) in bench_sorted.iter().zip(slots.iter()) {
        if plays_of(bench_team) >= plays {
            continue;
        }
        if is_a {
            pairings[i].0 = (*bench_team).clone();
        } else {
            pairings[i].1 = (*bench_team).clone();
        }
    }
}
