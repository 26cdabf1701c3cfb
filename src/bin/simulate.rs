//! Round-generation soak harness: synthesize (or load) a roster, generate
//! rounds with the chosen strategy, and report pairing fairness after each.
//! Run with: cargo run --bin simulate -- --players 9 --courts 2 --rounds 12
//! Repeated teammate pairs print red, repeated matchups yellow.

use court_rounds::{
    generate_round, matches_played, Court, FixedTeam, GameConfig, Gender, GenderMode,
    GenerationStrategy, HistoryIndex, Match, PairKey, Participant, PlayerId, Round, RoundRequest,
    SetScore, StandingEntry,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

struct Options {
    players: usize,
    courts: usize,
    rounds: usize,
    strategy: GenerationStrategy,
    gender_mode: GenderMode,
    fixed_teams: bool,
    roster_path: Option<String>,
    json: bool,
}

fn usage() -> ! {
    eprintln!(
        "usage: simulate [--players N] [--courts N] [--rounds N] \
         [--strategy random|rating|winners_court|escalera] [--mix-pairs] \
         [--fixed-teams] [--roster FILE.csv] [--json]"
    );
    std::process::exit(2);
}

fn parse_options() -> Options {
    let mut opts = Options {
        players: 8,
        courts: 2,
        rounds: 10,
        strategy: GenerationStrategy::Random,
        gender_mode: GenderMode::Any,
        fixed_teams: false,
        roster_path: None,
        json: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--players" => opts.players = parse_value(args.next()),
            "--courts" => opts.courts = parse_value(args.next()),
            "--rounds" => opts.rounds = parse_value(args.next()),
            "--strategy" => {
                opts.strategy = match args.next().as_deref() {
                    Some("random") => GenerationStrategy::Random,
                    Some("rating") => GenerationStrategy::Rating,
                    Some("winners_court") => GenerationStrategy::WinnersCourt,
                    Some("escalera") => GenerationStrategy::Escalera,
                    _ => usage(),
                }
            }
            "--mix-pairs" => opts.gender_mode = GenderMode::MixPairs,
            "--fixed-teams" => opts.fixed_teams = true,
            "--roster" => opts.roster_path = args.next(),
            "--json" => opts.json = true,
            _ => usage(),
        }
    }
    opts
}

fn parse_value(value: Option<String>) -> usize {
    value.and_then(|v| v.parse().ok()).unwrap_or_else(|| usage())
}

/// Roster rows are `name,gender,level` (gender: male/female/non_binary/unknown).
fn load_roster(path: &str) -> Result<Vec<(String, Participant)>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut roster = Vec::new();
    for record in reader.records() {
        let record = record?;
        let name = record.get(0).unwrap_or("?").to_string();
        let gender = match record.get(1).map(str::trim) {
            Some("male") => Gender::Male,
            Some("female") => Gender::Female,
            Some("non_binary") => Gender::NonBinary,
            _ => Gender::PreferNotToSay,
        };
        let level: f64 = record.get(2).and_then(|v| v.trim().parse().ok()).unwrap_or(1.0);
        roster.push((name, Participant::new(Uuid::new_v4(), gender, level)));
    }
    Ok(roster)
}

fn synthetic_roster(count: usize, rng: &mut impl Rng) -> Vec<(String, Participant)> {
    (0..count)
        .map(|i| {
            let name = if i < 26 {
                char::from(b'A' + i as u8).to_string()
            } else {
                format!("P{}", i + 1)
            };
            let gender = if i % 2 == 0 { Gender::Male } else { Gender::Female };
            let level = rng.gen_range(1.0..7.0);
            (name, Participant::new(Uuid::new_v4(), gender, level))
        })
        .collect()
}

/// Fill each generated match with one random scored set so that ladder-style
/// strategies see a complete previous round.
fn score_round(round: &mut Round, rng: &mut impl Rng) {
    for m in &mut round.matches {
        if !m.has_players() {
            continue;
        }
        let (winner, loser) = (6, rng.gen_range(0..=4));
        m.sets[0] = if rng.gen_bool(0.5) {
            SetScore { team_a: winner, team_b: loser }
        } else {
            SetScore { team_a: loser, team_b: winner }
        };
    }
}

/// Score-delta standings over the played rounds, best first (the external
/// standings calculator stands in for itself here).
fn standings_of(ids: &[PlayerId], rounds: &[Round]) -> Vec<StandingEntry> {
    let mut delta: HashMap<PlayerId, i64> = ids.iter().map(|&id| (id, 0)).collect();
    for round in rounds {
        for m in round.matches.iter().filter(|m| m.has_players()) {
            let (a, b) = m.score_totals();
            for id in &m.team_a {
                *delta.entry(*id).or_insert(0) += i64::from(a) - i64::from(b);
            }
            for id in &m.team_b {
                *delta.entry(*id).or_insert(0) += i64::from(b) - i64::from(a);
            }
        }
    }
    let mut entries: Vec<StandingEntry> = delta
        .into_iter()
        .map(|(player, score_delta)| StandingEntry { player, score_delta })
        .collect();
    entries.sort_by_key(|e| std::cmp::Reverse(e.score_delta));
    entries
}

fn team_label(team: &[PlayerId], names: &HashMap<PlayerId, String>) -> String {
    team.iter()
        .map(|id| names.get(id).cloned().unwrap_or_else(|| "?".into()))
        .collect::<Vec<_>>()
        .join("")
}

fn print_match(i: usize, m: &Match, names: &HashMap<PlayerId, String>, history: &HistoryIndex) {
    let mut team_a = team_label(&m.team_a, names);
    let mut team_b = team_label(&m.team_b, names);
    let repeated = |team: &[PlayerId]| {
        team.len() >= 2 && history.teammate_count(PairKey::new(team[0], team[1])) > 0
    };
    if repeated(&m.team_a) {
        team_a = format!("{RED}{team_a}{RESET}");
    }
    if repeated(&m.team_b) {
        team_b = format!("{RED}{team_b}{RESET}");
    }
    let mut line = format!("{team_a} - {team_b}");
    if history.matchup_score(&m.team_a, &m.team_b) > 0 {
        line = format!("{YELLOW}{line}{RESET}");
    }
    println!("  {}. {line}", i + 1);
}

fn print_fairness(ids: &[PlayerId], names: &HashMap<PlayerId, String>, rounds: &[Round]) {
    let played = matches_played(ids, rounds);
    let max = played.values().copied().max().unwrap_or(0);

    let mut labels: Vec<(String, u32)> = ids
        .iter()
        .map(|id| (names[id].clone(), played.get(id).copied().unwrap_or(0)))
        .collect();
    labels.sort();
    let counts: Vec<String> = labels
        .iter()
        .map(|(name, count)| match max - count {
            0 => format!("{name}{count}"),
            1 => format!("{YELLOW}{name}{count}{RESET}"),
            _ => format!("{RED}{name}{count}{RESET}"),
        })
        .collect();
    println!("  match counts: {}", counts.join(" "));

    let history = HistoryIndex::from_rounds(rounds);
    let mut unique: HashMap<PlayerId, HashSet<PlayerId>> = HashMap::new();
    for (key, count) in &history.opponents {
        if *count == 0 {
            continue;
        }
        let (a, b) = key.players();
        unique.entry(a).or_default().insert(b);
        unique.entry(b).or_default().insert(a);
    }
    let mut opponents: Vec<String> = ids
        .iter()
        .map(|id| format!("{}{}", names[id], unique.get(id).map_or(0, HashSet::len)))
        .collect();
    opponents.sort();
    println!("  unique opponents: {}", opponents.join(" "));

    let mut pairs: Vec<(PairKey, u32)> = history
        .teammates
        .iter()
        .map(|(key, count)| (*key, *count))
        .filter(|(_, count)| *count > 1)
        .collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
    let repeats: Vec<String> = pairs
        .iter()
        .map(|(key, count)| {
            let (a, b) = key.players();
            format!("{}{}x{count}", names[&a], names[&b])
        })
        .collect();
    if !repeats.is_empty() {
        println!("  repeated pairs: {}", repeats.join(" "));
    }
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let opts = parse_options();
    let mut rng = rand::thread_rng();

    let named_roster = match &opts.roster_path {
        Some(path) => match load_roster(path) {
            Ok(roster) => roster,
            Err(err) => {
                eprintln!("failed to read roster {path}: {err}");
                std::process::exit(1);
            }
        },
        None => synthetic_roster(opts.players, &mut rng),
    };

    let names: HashMap<PlayerId, String> = named_roster
        .iter()
        .map(|(name, p)| (p.user_id, name.clone()))
        .collect();
    let roster: Vec<Participant> = named_roster.into_iter().map(|(_, p)| p).collect();
    let ids: Vec<PlayerId> = roster.iter().map(|p| p.user_id).collect();

    let fixed_teams: Vec<FixedTeam> = if opts.fixed_teams {
        let mut shuffled = ids.clone();
        shuffled.shuffle(&mut rng);
        let teams: Vec<FixedTeam> = shuffled
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| FixedTeam::new(i as u32 + 1, pair.to_vec()))
            .collect();
        for team in &teams {
            println!("team {}: {}", team.team_number, team_label(&team.players, &names));
        }
        teams
    } else {
        Vec::new()
    };

    // Escalera runs through its standalone module; everything else through
    // the orchestrator.
    let strategy = opts.strategy;
    let config = GameConfig {
        strategy,
        gender_mode: opts.gender_mode,
        courts: (0..opts.courts as u32)
            .map(|order| Court { id: Uuid::new_v4(), order })
            .collect(),
        has_fixed_teams: !fixed_teams.is_empty(),
        sets_per_match: 1,
    };

    log::info!(
        "simulating {} rounds: {} players, {} courts, {:?}",
        opts.rounds,
        roster.len(),
        opts.courts,
        strategy
    );

    let mut rounds: Vec<Round> = Vec::new();
    for number in 1..=opts.rounds {
        let standings = standings_of(&ids, &rounds);
        let request = RoundRequest {
            config: &config,
            roster: &roster,
            fixed_teams: &fixed_teams,
            rounds: &rounds,
            standings: &standings,
            seed_players: &[],
        };
        let matches = if strategy == GenerationStrategy::Escalera {
            court_rounds::generate_escalera_round(
                &config,
                &roster,
                &fixed_teams,
                &rounds,
                &mut rng,
            )
        } else {
            generate_round(&request, &mut rng)
        };

        if matches.is_empty() {
            println!("round {number}: no matches possible");
            continue;
        }

        let history = HistoryIndex::from_rounds(&rounds);
        println!("round {number}");
        for (i, m) in matches.iter().enumerate() {
            print_match(i, m, &names, &history);
        }

        let mut round = Round::new(matches);
        score_round(&mut round, &mut rng);
        rounds.push(round);

        print_fairness(&ids, &names, &rounds);
    }

    if opts.json {
        match serde_json::to_string_pretty(&rounds) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("failed to serialize rounds: {err}"),
        }
    }
}
