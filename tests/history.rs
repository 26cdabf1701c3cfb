//! Integration tests for history derivation: play counts and pair indexes.

use court_rounds::{matches_played, HistoryIndex, Match, PairKey, PlayerId, Round, SetScore};
use uuid::Uuid;

fn players(n: usize) -> Vec<PlayerId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

fn round(matches: Vec<Match>) -> Round {
    Round::new(matches)
}

fn match_of(team_a: &[PlayerId], team_b: &[PlayerId]) -> Match {
    Match::new(team_a.to_vec(), team_b.to_vec(), 1, None)
}

#[test]
fn empty_rounds_produce_empty_index() {
    let index = HistoryIndex::from_rounds(&[]);
    assert!(index.teammates.is_empty());
    assert!(index.opponents.is_empty());
    assert!(index.last_round_teammates.is_empty());
}

#[test]
fn teammate_and_opponent_counts_accumulate_per_round() {
    let p = players(4);
    let rounds = vec![
        round(vec![match_of(&[p[0], p[1]], &[p[2], p[3]])]),
        round(vec![match_of(&[p[0], p[1]], &[p[2], p[3]])]),
        round(vec![match_of(&[p[0], p[2]], &[p[1], p[3]])]),
    ];

    let index = HistoryIndex::from_rounds(&rounds);
    assert_eq!(index.teammate_count(PairKey::new(p[0], p[1])), 2);
    assert_eq!(index.teammate_count(PairKey::new(p[0], p[2])), 1);
    assert_eq!(index.teammate_count(PairKey::new(p[0], p[3])), 0);
    assert_eq!(index.opponent_count(PairKey::new(p[0], p[2])), 2);
    assert_eq!(index.opponent_count(PairKey::new(p[0], p[3])), 3);
}

#[test]
fn matches_without_both_teams_are_excluded_everywhere() {
    let p = players(4);
    let empty_side = match_of(&[p[0], p[1]], &[]);
    let rounds = vec![round(vec![empty_side, match_of(&[p[0], p[1]], &[p[2], p[3]])])];

    let index = HistoryIndex::from_rounds(&rounds);
    assert_eq!(index.teammate_count(PairKey::new(p[0], p[1])), 1);

    let played = matches_played(&p, &rounds);
    assert_eq!(played[&p[0]], 1);
    assert_eq!(played[&p[2]], 1);
}

#[test]
fn last_round_teammates_cover_only_the_most_recent_round() {
    let p = players(8);
    let rounds = vec![
        round(vec![match_of(&[p[0], p[1]], &[p[2], p[3]])]),
        round(vec![match_of(&[p[4], p[5]], &[p[6], p[7]])]),
    ];

    let index = HistoryIndex::from_rounds(&rounds);
    assert!(index.last_round_teammates.contains(&PairKey::new(p[4], p[5])));
    assert!(index.last_round_teammates.contains(&PairKey::new(p[6], p[7])));
    assert!(!index.last_round_teammates.contains(&PairKey::new(p[0], p[1])));
}

#[test]
fn matches_played_counts_rounds_and_ignores_unknown_ids() {
    let p = players(5);
    let rounds = vec![
        round(vec![match_of(&[p[0], p[1]], &[p[2], p[3]])]),
        round(vec![match_of(&[p[0], p[2]], &[p[1], p[4]])]),
    ];

    let played = matches_played(&p[..4], &rounds);
    assert_eq!(played[&p[0]], 2);
    assert_eq!(played[&p[3]], 1);
    assert!(!played.contains_key(&p[4]));
}

#[test]
fn history_computation_is_idempotent() {
    let p = players(6);
    let mut m = match_of(&[p[0], p[1]], &[p[2], p[3]]);
    m.sets = vec![SetScore { team_a: 6, team_b: 3 }];
    let rounds = vec![round(vec![m]), round(vec![match_of(&[p[4], p[5]], &[p[0], p[2]])])];

    let first = HistoryIndex::from_rounds(&rounds);
    let second = HistoryIndex::from_rounds(&rounds);
    assert_eq!(first.teammates, second.teammates);
    assert_eq!(first.opponents, second.opponents);
    assert_eq!(first.last_round_teammates, second.last_round_teammates);
}
