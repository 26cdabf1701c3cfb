//! Integration tests for league season team generation: exclusivity of new
//! teams, preconditions, and failure semantics.

use chrono::{TimeZone, Utc};
use court_rounds::{
    generate_season_round, GenderMode, Match, PairKey, Participant, PlayerId, Round, ScheduleError,
    SeasonGroup, SeasonRules, SetScore, WinnerRule,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use uuid::Uuid;

fn rules() -> SeasonRules {
    SeasonRules {
        gender_mode: GenderMode::Any,
        winner_rule: WinnerRule::ByMatchesWon,
        sets_per_match: 3,
        game_minutes: 120,
    }
}

fn group_roster(n: usize) -> Vec<Participant> {
    (0..n)
        .map(|i| {
            let gender = if i % 2 == 0 {
                court_rounds::Gender::Male
            } else {
                court_rounds::Gender::Female
            };
            Participant::new(Uuid::new_v4(), gender, 3.0)
        })
        .collect()
}

/// One historical match where `a` and `b` were teammates (against `c`/`d`).
fn teammate_round(a: PlayerId, b: PlayerId, c: PlayerId, d: PlayerId) -> Round {
    let mut m = Match::new(vec![a, b], vec![c, d], 1, None);
    m.sets = vec![SetScore { team_a: 6, team_b: 4 }];
    Round::new(vec![m])
}

fn group<'a>(
    roster: &'a [Participant],
    rounds: &'a [Round],
    rules: &'a SeasonRules,
) -> SeasonGroup<'a> {
    SeasonGroup {
        group_id: Uuid::new_v4(),
        roster,
        season_rounds: rounds,
        rules,
        starts_at: Utc.with_ymd_and_hms(2026, 3, 7, 18, 0, 0).unwrap(),
    }
}

#[test]
fn small_groups_are_skipped_silently() {
    let roster = group_roster(2);
    let rules = rules();
    let mut rng = StdRng::seed_from_u64(1);
    let games = generate_season_round(&group(&roster, &[], &rules), &mut rng).unwrap();
    assert!(games.is_empty());
}

#[test]
fn odd_group_size_is_a_hard_error() {
    let roster = group_roster(5);
    let rules = rules();
    let mut rng = StdRng::seed_from_u64(2);
    let err = generate_season_round(&group(&roster, &[], &rules), &mut rng).unwrap_err();
    assert_eq!(err, ScheduleError::OddGroupSize { participants: 5 });
    assert!(!err.is_internal());
}

#[test]
fn fresh_group_forms_disjoint_teams_and_inherits_rules() {
    let roster = group_roster(8);
    let rules = rules();
    let mut rng = StdRng::seed_from_u64(3);

    let games = generate_season_round(&group(&roster, &[], &rules), &mut rng).unwrap();

    // 8 players: 4 teams, paired into 2 games.
    assert_eq!(games.len(), 2);
    let mut seen: HashSet<PlayerId> = HashSet::new();
    for game in &games {
        assert_eq!(game.team_a.len(), 2);
        assert_eq!(game.team_b.len(), 2);
        for id in game.team_a.iter().chain(&game.team_b) {
            assert!(seen.insert(*id), "player scheduled twice in one league round");
        }
        assert_eq!(game.rules, rules);
        assert_eq!((game.ends_at - game.starts_at).num_minutes(), 120);
    }
    assert_eq!(seen.len(), 8);
}

#[test]
fn played_teams_are_never_selected_again() {
    let roster = group_roster(6);
    let ids: Vec<PlayerId> = roster.iter().map(|p| p.user_id).collect();
    let rules = rules();

    // Teams (0,1), (2,3) and (4,5) have played; 12 legal teams remain.
    let rounds = vec![
        teammate_round(ids[0], ids[1], ids[2], ids[3]),
        teammate_round(ids[4], ids[5], ids[0], ids[1]),
    ];
    let played: HashSet<PairKey> = [
        PairKey::new(ids[0], ids[1]),
        PairKey::new(ids[2], ids[3]),
        PairKey::new(ids[4], ids[5]),
    ]
    .into_iter()
    .collect();

    let mut rng = StdRng::seed_from_u64(4);
    let games = generate_season_round(&group(&roster, &rounds, &rules), &mut rng).unwrap();

    // 3 fresh teams cover the group; one sits out of the single pairing.
    let mut teams: HashSet<PairKey> = HashSet::new();
    let mut placed: HashSet<PlayerId> = HashSet::new();
    for game in &games {
        for side in [&game.team_a, &game.team_b] {
            teams.insert(PairKey::new(side[0], side[1]));
            placed.extend(side.iter().copied());
        }
    }
    assert_eq!(games.len(), 1);
    assert_eq!(placed.len(), 4);
    assert!(teams.is_disjoint(&played));
}

#[test]
fn exhausted_pairing_budget_is_a_hard_error() {
    let roster = group_roster(4);
    let ids: Vec<PlayerId> = roster.iter().map(|p| p.user_id).collect();
    let rules = rules();

    // All C(4,2) = 6 pairs have been teammates.
    let rounds = vec![
        teammate_round(ids[0], ids[1], ids[2], ids[3]),
        teammate_round(ids[0], ids[2], ids[1], ids[3]),
        teammate_round(ids[0], ids[3], ids[1], ids[2]),
    ];

    let mut rng = StdRng::seed_from_u64(5);
    let err = generate_season_round(&group(&roster, &rounds, &rules), &mut rng).unwrap_err();
    assert_eq!(err, ScheduleError::SeasonPairingsExhausted);
    assert!(!err.is_internal());
}

#[test]
fn exclusivity_holds_over_randomized_season_histories() {
    let rules = rules();
    let mut rng = StdRng::seed_from_u64(6);

    for _ in 0..40 {
        let roster = group_roster(8);
        let ids: Vec<PlayerId> = roster.iter().map(|p| p.user_id).collect();

        // A random season so far: a few rounds of random disjoint pairings.
        let mut rounds = Vec::new();
        for _ in 0..rng.gen_range(0..4usize) {
            let mut shuffled = ids.clone();
            shuffled.shuffle(&mut rng);
            rounds.push(teammate_round(shuffled[0], shuffled[1], shuffled[2], shuffled[3]));
        }
        let played: HashSet<PairKey> = rounds
            .iter()
            .flat_map(|r| r.matches.iter())
            .flat_map(|m| {
                [
                    PairKey::new(m.team_a[0], m.team_a[1]),
                    PairKey::new(m.team_b[0], m.team_b[1]),
                ]
            })
            .collect();

        match generate_season_round(&group(&roster, &rounds, &rules), &mut rng) {
            Ok(games) => {
                for game in &games {
                    for side in [&game.team_a, &game.team_b] {
                        let key = PairKey::new(side[0], side[1]);
                        assert!(
                            !played.contains(&key),
                            "league exclusivity violated: a played team was selected"
                        );
                    }
                }
            }
            Err(err) => assert!(!err.is_internal(), "internal invariant error: {err}"),
        }
    }
}
