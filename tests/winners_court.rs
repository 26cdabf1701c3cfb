//! Integration tests for the winners-court strategy.

use court_rounds::{
    generate_winners_court_round, Court, GameConfig, Gender, GenderMode, GenerationStrategy,
    Match, Participant, PlayerId, Round, SetScore,
};
use std::collections::HashSet;
use uuid::Uuid;

fn config(courts: usize) -> GameConfig {
    GameConfig {
        strategy: GenerationStrategy::WinnersCourt,
        gender_mode: GenderMode::Any,
        courts: (0..courts as u32)
            .map(|order| Court { id: Uuid::new_v4(), order })
            .collect(),
        has_fixed_teams: false,
        sets_per_match: 1,
    }
}

fn ranked_roster(n: usize) -> Vec<Participant> {
    (0..n)
        .map(|i| {
            let gender = if i % 2 == 0 { Gender::Male } else { Gender::Female };
            Participant::new(Uuid::new_v4(), gender, (n - i) as f64)
        })
        .collect()
}

fn scored(mut m: Match, team_a: u32, team_b: u32) -> Match {
    m.sets = vec![SetScore { team_a, team_b }];
    m
}

#[test]
fn first_round_seeds_by_level_in_alternating_blocks() {
    let roster = ranked_roster(8);
    let p: Vec<PlayerId> = roster.iter().map(|x| x.user_id).collect();

    let matches = generate_winners_court_round(&config(2), &roster, &[]);

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].team_a, vec![p[0], p[2]]);
    assert_eq!(matches[0].team_b, vec![p[1], p[3]]);
    assert_eq!(matches[1].team_a, vec![p[4], p[6]]);
    assert_eq!(matches[1].team_b, vec![p[5], p[7]]);
}

#[test]
fn winners_climb_and_losers_drop_without_reusing_players() {
    let roster = ranked_roster(12);
    let config = config(3);

    let first = generate_winners_court_round(&config, &roster, &[]);
    assert_eq!(first.len(), 3);

    let winners: Vec<HashSet<PlayerId>> =
        first.iter().map(|m| m.team_a.iter().copied().collect()).collect();
    let losers: Vec<HashSet<PlayerId>> =
        first.iter().map(|m| m.team_b.iter().copied().collect()).collect();
    let rounds = vec![Round::new(
        first.into_iter().map(|m| scored(m, 6, 0)).collect(),
    )];

    let next = generate_winners_court_round(&config, &roster, &rounds);
    assert_eq!(next.len(), 3);

    // Top court: winner pairs of courts 0 and 1, split across the new teams.
    let top: HashSet<PlayerId> = next[0].players().collect();
    assert_eq!(top, winners[0].union(&winners[1]).copied().collect());

    // Middle court: losers of court 0 with winners of court 2.
    let middle: HashSet<PlayerId> = next[1].players().collect();
    assert_eq!(middle, losers[0].union(&winners[2]).copied().collect());

    // Bottom court: the two lowest loser pairs.
    let bottom: HashSet<PlayerId> = next[2].players().collect();
    assert_eq!(bottom, losers[1].union(&losers[2]).copied().collect());

    let all: Vec<PlayerId> = next.iter().flat_map(Match::players).collect();
    assert_eq!(all.iter().collect::<HashSet<_>>().len(), all.len());
}

#[test]
fn a_tied_match_counts_as_a_team_a_win() {
    let roster = ranked_roster(4);
    let config = config(1);

    let first = generate_winners_court_round(&config, &roster, &[]);
    let team_a: Vec<PlayerId> = first[0].team_a.clone();
    let team_b: Vec<PlayerId> = first[0].team_b.clone();
    let rounds = vec![Round::new(vec![scored(first.into_iter().next().unwrap(), 4, 4)])];

    let next = generate_winners_court_round(&config, &roster, &rounds);
    assert_eq!(next.len(), 1);
    // Single court mixes winners and losers; team A's players lead each side.
    assert_eq!(next[0].team_a, vec![team_a[0], team_b[0]]);
    assert_eq!(next[0].team_b, vec![team_a[1], team_b[1]]);
}
