//! Eligibility filtering, per-round match-count computation, and rotation
//! trimming of oversized pools.

use crate::logic::history::{matches_played, team_rounds_played};
use crate::models::{team_key, FixedTeam, Gender, GenderMode, Participant, PlayerId, Round};

/// Players per generated match (two teams of two).
pub const GROUP_SIZE: usize = 4;

/// Participants usable for the next round: status Playing, then filtered by
/// the game's gender mode. MixPairs keeps disclosed male/female players only;
/// every other non-Any mode excludes players who prefer not to disclose.
pub fn eligible_participants(roster: &[Participant], mode: GenderMode) -> Vec<Participant> {
    roster
        .iter()
        .filter(|p| p.is_playing())
        .filter(|p| match mode {
            GenderMode::Any => true,
            GenderMode::Men => p.gender == Gender::Male,
            GenderMode::Women => p.gender == Gender::Female,
            GenderMode::MixPairs => matches!(p.gender, Gender::Male | Gender::Female),
            GenderMode::Mixed => p.gender != Gender::PreferNotToSay,
        })
        .cloned()
        .collect()
}

/// Target match count: bounded by courts and by how many full matches the
/// eligible pool supports. MixPairs forms teams per gender, so the bound is
/// the scarcer gender's pair count. Zero means "skip this round", not failure.
pub fn num_matches(num_courts: usize, participants: &[Participant], mode: GenderMode) -> usize {
    if mode == GenderMode::MixPairs {
        let males = count_gender(participants, Gender::Male);
        let females = count_gender(participants, Gender::Female);
        return num_courts.min(males.min(females) / 2);
    }
    num_courts.min(participants.len() / GROUP_SIZE)
}

fn count_gender(participants: &[Participant], gender: Gender) -> usize {
    participants.iter().filter(|p| p.gender == gender).count()
}

/// Fixed teams usable for the next round: at least 2 members, every member
/// eligible (Playing), and the team composition allowed by the gender mode.
pub fn filtered_fixed_teams(
    fixed_teams: &[FixedTeam],
    roster: &[Participant],
    mode: GenderMode,
) -> Vec<Vec<PlayerId>> {
    let eligible = eligible_participants(roster, GenderMode::Any);
    let gender_of = |id: PlayerId| eligible.iter().find(|p| p.user_id == id).map(|p| p.gender);

    fixed_teams
        .iter()
        .filter(|t| t.players.len() >= 2)
        .filter(|t| t.players.iter().all(|&id| gender_of(id).is_some()))
        .filter(|t| {
            let genders: Vec<Gender> = t.players.iter().filter_map(|&id| gender_of(id)).collect();
            match mode {
                GenderMode::Any => true,
                GenderMode::Men => genders.iter().all(|&g| g == Gender::Male),
                GenderMode::Women => genders.iter().all(|&g| g == Gender::Female),
                GenderMode::MixPairs => {
                    genders.contains(&Gender::Male)
                        && genders.contains(&Gender::Female)
                        && !genders.contains(&Gender::PreferNotToSay)
                }
                GenderMode::Mixed => genders.iter().all(|&g| g != Gender::PreferNotToSay),
            }
        })
        .map(|t| t.players.clone())
        .collect()
}

/// Trim a ranked player list to `needed`, keeping those with the fewest rounds
/// played (rank breaks ties) and preserving rank order among the kept.
pub fn trim_with_rotation(ranked: &[PlayerId], needed: usize, rounds: &[Round]) -> Vec<PlayerId> {
    let played = matches_played(ranked, rounds);
    let mut indexed: Vec<(usize, PlayerId, u32)> = ranked
        .iter()
        .enumerate()
        .map(|(rank, &id)| (rank, id, played.get(&id).copied().unwrap_or(0)))
        .collect();
    indexed.sort_by_key(|&(rank, _, plays)| (plays, rank));
    indexed.truncate(needed);
    indexed.sort_by_key(|&(rank, _, _)| rank);
    indexed.into_iter().map(|(_, id, _)| id).collect()
}

/// Team-level counterpart of [`trim_with_rotation`], counting rounds any team
/// member appeared in.
pub fn trim_teams_with_rotation(
    ranked: &[Vec<PlayerId>],
    needed: usize,
    rounds: &[Round],
) -> Vec<Vec<PlayerId>> {
    let played = team_rounds_played(ranked, rounds);
    let mut indexed: Vec<(usize, u32)> = ranked
        .iter()
        .enumerate()
        .map(|(rank, team)| (rank, played.get(&team_key(team)).copied().unwrap_or(0)))
        .collect();
    indexed.sort_by_key(|&(rank, plays)| (plays, rank));
    indexed.truncate(needed);
    indexed.sort_by_key(|&(rank, _)| rank);
    indexed.into_iter().map(|(rank, _)| ranked[rank].clone()).collect()
}
