//! Round generation entry point: dispatches to the strategy configured on the
//! game and packages the result.

use crate::logic::eligibility::filtered_fixed_teams;
use crate::logic::ladder::generate_escalera_round;
use crate::logic::pairing::generate_random_round;
use crate::logic::rating::generate_rating_round;
use crate::logic::winners_court::generate_winners_court_round;
use crate::models::{
    FixedTeam, GameConfig, GenerationStrategy, Match, Participant, PlayerId, Round, StandingEntry,
};
use rand::Rng;

/// Everything a round-generation call needs, resolved by the caller: the game
/// configuration, the roster, prior rounds of the same game (oldest first),
/// current standings, and any manually seeded players for Handmade games.
pub struct RoundRequest<'a> {
    pub config: &'a GameConfig,
    pub roster: &'a [Participant],
    pub fixed_teams: &'a [FixedTeam],
    pub rounds: &'a [Round],
    pub standings: &'a [StandingEntry],
    pub seed_players: &'a [PlayerId],
}

/// Generate the matches of the next round for the configured strategy.
///
/// An empty result is a soft outcome ("not ready" or "not enough players"),
/// never a failure. RoundRobin and Escalera are not implemented at this entry
/// point and always return an empty list; the standalone escalera module
/// ([`generate_escalera_round`]) is the supported ladder API.
pub fn generate_round(request: &RoundRequest<'_>, rng: &mut impl Rng) -> Vec<Match> {
    match request.config.strategy {
        GenerationStrategy::Handmade => handmade_round(request),
        GenerationStrategy::Fixed | GenerationStrategy::Random => generate_random_round(
            request.config,
            request.roster,
            request.fixed_teams,
            request.rounds,
            rng,
        ),
        GenerationStrategy::Rating => generate_rating_round(
            request.config,
            request.roster,
            request.fixed_teams,
            request.standings,
            request.rounds,
            rng,
        ),
        GenerationStrategy::WinnersCourt => {
            generate_winners_court_round(request.config, request.roster, request.rounds)
        }
        GenerationStrategy::RoundRobin | GenerationStrategy::Escalera => {
            log::debug!(
                "strategy {:?} not implemented at the round-generator entry point",
                request.config.strategy
            );
            Vec::new()
        }
    }
}

/// Convenience wrapper: the generated matches as a new [`Round`], or `None`
/// when the strategy produced nothing this time.
pub fn next_round(request: &RoundRequest<'_>, rng: &mut impl Rng) -> Option<Round> {
    let matches = generate_round(request, rng);
    if matches.is_empty() {
        None
    } else {
        Some(Round::new(matches))
    }
}

/// Handmade layout: the organizer's seeded players pass through unchanged.
/// Two seeds play 1v1; four seeds split along configured fixed teams when the
/// seeds form exactly two of them, positionally otherwise. With no seeds the
/// round opens with a single empty match shell for manual placement.
fn handmade_round(request: &RoundRequest<'_>) -> Vec<Match> {
    let config = request.config;
    let courts = config.sorted_court_ids();
    let court = courts.first().copied();
    let seeds = request.seed_players;

    match seeds.len() {
        2 => vec![Match::new(
            vec![seeds[0]],
            vec![seeds[1]],
            config.sets_per_match,
            court,
        )],
        4 => {
            if config.has_fixed_teams {
                let teams =
                    filtered_fixed_teams(request.fixed_teams, request.roster, config.gender_mode);
                let seeded: Vec<&Vec<PlayerId>> = teams
                    .iter()
                    .filter(|t| t.iter().all(|id| seeds.contains(id)))
                    .collect();
                if seeded.len() == 2 {
                    return vec![Match::new(
                        seeded[0].clone(),
                        seeded[1].clone(),
                        config.sets_per_match,
                        court,
                    )];
                }
            }
            vec![Match::new(
                vec![seeds[0], seeds[1]],
                vec![seeds[2], seeds[3]],
                config.sets_per_match,
                court,
            )]
        }
        _ => vec![Match::new(Vec::new(), Vec::new(), config.sets_per_match, court)],
    }
}
