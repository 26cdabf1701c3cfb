//! Integration tests for the random strategy: pair selection, matchup forming,
//! and fairness over many simulated rounds.

use court_rounds::{
    generate_random_round, matches_played, Court, FixedTeam, GameConfig, Gender, GenderMode,
    GenerationStrategy, HistoryIndex, Match, PairKey, Participant, PlayerId, Round, SetScore,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use uuid::Uuid;

fn roster(n: usize) -> Vec<Participant> {
    (0..n)
        .map(|i| {
            let gender = if i % 2 == 0 { Gender::Male } else { Gender::Female };
            Participant::new(Uuid::new_v4(), gender, 3.0)
        })
        .collect()
}

fn config(courts: usize) -> GameConfig {
    GameConfig {
        strategy: GenerationStrategy::Random,
        gender_mode: GenderMode::Any,
        courts: (0..courts as u32)
            .map(|order| Court { id: Uuid::new_v4(), order })
            .collect(),
        has_fixed_teams: false,
        sets_per_match: 1,
    }
}

fn round_players(matches: &[Match]) -> Vec<PlayerId> {
    matches.iter().flat_map(Match::players).collect()
}

#[test]
fn first_round_fills_both_courts_with_distinct_players() {
    let roster = roster(8);
    let config = config(2);
    let mut rng = StdRng::seed_from_u64(7);

    let matches = generate_random_round(&config, &roster, &[], &[], &mut rng);

    assert_eq!(matches.len(), 2);
    for m in &matches {
        assert_eq!(m.team_a.len(), 2);
        assert_eq!(m.team_b.len(), 2);
        assert_eq!(m.sets, vec![SetScore::default()]);
        assert!(m.court_id.is_some());
    }
    let used = round_players(&matches);
    let distinct: HashSet<_> = used.iter().collect();
    assert_eq!(used.len(), 8);
    assert_eq!(distinct.len(), 8);
}

#[test]
fn match_count_is_bounded_by_courts_and_pool_size() {
    let mut rng = StdRng::seed_from_u64(1);

    // 12 players but only 2 courts.
    let matches = generate_random_round(&config(2), &roster(12), &[], &[], &mut rng);
    assert_eq!(matches.len(), 2);

    // 5 courts but only 8 players.
    let matches = generate_random_round(&config(5), &roster(8), &[], &[], &mut rng);
    assert_eq!(matches.len(), 2);

    // Not enough players for a single match.
    let matches = generate_random_round(&config(2), &roster(3), &[], &[], &mut rng);
    assert!(matches.is_empty());
}

#[test]
fn last_round_pairs_are_not_repeated_when_alternatives_exist() {
    let roster = roster(8);
    let config = config(2);
    let mut rng = StdRng::seed_from_u64(11);

    let first = generate_random_round(&config, &roster, &[], &[], &mut rng);
    let rounds = vec![Round::new(first)];
    let last_pairs = HistoryIndex::from_rounds(&rounds).last_round_teammates;

    for _ in 0..10 {
        let next = generate_random_round(&config, &roster, &[], &rounds, &mut rng);
        for m in &next {
            for team in [&m.team_a, &m.team_b] {
                assert!(
                    !last_pairs.contains(&PairKey::new(team[0], team[1])),
                    "pair repeated from the immediately preceding round"
                );
            }
        }
    }
}

#[test]
fn players_never_appear_twice_in_one_round() {
    let roster = roster(10);
    let config = config(2);
    let mut rng = StdRng::seed_from_u64(3);
    let mut rounds: Vec<Round> = Vec::new();

    for _ in 0..12 {
        let matches = generate_random_round(&config, &roster, &[], &rounds, &mut rng);
        let used = round_players(&matches);
        let distinct: HashSet<_> = used.iter().collect();
        assert_eq!(used.len(), distinct.len());
        rounds.push(Round::new(matches));
    }
}

#[test]
fn bench_rotation_keeps_play_counts_close_over_many_rounds() {
    let roster = roster(10);
    let ids: Vec<PlayerId> = roster.iter().map(|p| p.user_id).collect();
    let config = config(2);
    let mut rng = StdRng::seed_from_u64(42);
    let mut rounds: Vec<Round> = Vec::new();

    let spread = |rounds: &[Round]| {
        let played = matches_played(&ids, rounds);
        let max = played.values().copied().max().unwrap_or(0);
        let min = played.values().copied().min().unwrap_or(0);
        max - min
    };

    for _ in 0..24 {
        let before = spread(&rounds);
        let matches = generate_random_round(&config, &roster, &[], &rounds, &mut rng);
        assert_eq!(matches.len(), 2);
        rounds.push(Round::new(matches));
        let after = spread(&rounds);
        assert!(after <= before + 1, "spread jumped from {before} to {after}");
    }

    assert!(spread(&rounds) <= 4, "play counts drifted apart: {}", spread(&rounds));
    let played = matches_played(&ids, &rounds);
    assert!(played.values().all(|&c| c > 0));
}

#[test]
fn mix_pairs_teams_are_one_male_one_female() {
    let roster = roster(8); // 4 male, 4 female
    let mut config = config(2);
    config.gender_mode = GenderMode::MixPairs;
    let mut rng = StdRng::seed_from_u64(5);

    let matches = generate_random_round(&config, &roster, &[], &[], &mut rng);
    assert_eq!(matches.len(), 2);
    for m in &matches {
        for team in [&m.team_a, &m.team_b] {
            let genders: Vec<Gender> = team
                .iter()
                .map(|id| roster.iter().find(|p| p.user_id == *id).unwrap().gender)
                .collect();
            assert!(genders.contains(&Gender::Male));
            assert!(genders.contains(&Gender::Female));
        }
    }
}

#[test]
fn fixed_teams_stay_together_and_rotate_by_usage() {
    let roster = roster(12);
    let ids: Vec<PlayerId> = roster.iter().map(|p| p.user_id).collect();
    let teams: Vec<FixedTeam> = ids
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| FixedTeam::new(i as u32 + 1, pair.to_vec()))
        .collect();

    let mut config = config(2);
    config.has_fixed_teams = true;
    let mut rng = StdRng::seed_from_u64(9);

    let team_keys: HashSet<PairKey> =
        teams.iter().map(|t| PairKey::new(t.players[0], t.players[1])).collect();

    let mut rounds: Vec<Round> = Vec::new();
    for _ in 0..6 {
        let matches = generate_random_round(&config, &roster, &teams, &rounds, &mut rng);
        assert_eq!(matches.len(), 2);
        for m in &matches {
            for side in [&m.team_a, &m.team_b] {
                assert!(team_keys.contains(&PairKey::new(side[0], side[1])));
            }
        }
        rounds.push(Round::new(matches));
    }

    // 6 teams over 2 courts: rotation keeps per-team appearances within 1.
    let grouped: Vec<Vec<PlayerId>> = teams.iter().map(|t| t.players.clone()).collect();
    let played = court_rounds::team_rounds_played(&grouped, &rounds);
    let max = played.values().copied().max().unwrap();
    let min = played.values().copied().min().unwrap();
    assert!(max - min <= 1, "team appearances drifted: {min}..{max}");
}
