//! Self-play simulation CLI.
//!
//! Plays random games against the rules engine, checks invariants after
//! every action and outputs game records as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 10)
//!   --players N     Players per game (default: 4)
//!   --max-turns N   Turn at which a game stops (default: 60)
//!   --skip P        Chance of skipping when a move exists (default: 0.1)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --map FILE      JSON map file (default: built-in map)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress summary output

use std::env;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use supplyline::board::MapGraph;
use supplyline::selfplay::{self, SelfPlayConfig};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut map_path: Option<PathBuf> = None;
    let mut output_path: Option<String> = None;
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--quiet" => {
                quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            flag if VALUE_FLAGS.contains(&flag) => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("{} expects a value", flag);
                    print_usage();
                    return ExitCode::FAILURE;
                };
                i += 1;
                let applied = match flag {
                    "--map" => {
                        map_path = Some(PathBuf::from(value));
                        Ok(())
                    }
                    "--output" => {
                        output_path = Some(value.clone());
                        Ok(())
                    }
                    _ => apply_flag(&mut config, flag, value),
                };
                if let Err(e) = applied {
                    eprintln!("invalid {} value '{}': {}", flag, value, e);
                    return ExitCode::FAILURE;
                }
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let default_filter = if quiet { "supplyline=warn" } else { "supplyline=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let map = match map_path {
        Some(path) => match MapGraph::load(&path) {
            Ok(map) => map,
            Err(e) => {
                eprintln!("failed to load map {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => MapGraph::standard(),
    };
    let map = Arc::new(map);

    if !quiet {
        eprintln!(
            "Self-play: {} games, {} players, {} turns, skip {:.2}, {} threads on map '{}'",
            config.num_games,
            config.players,
            config.max_turns,
            config.skip_probability,
            config.threads,
            map.name()
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&map, &config);
    let elapsed = start.elapsed();

    if !quiet {
        eprintln!("Completed {} games in {:.1}s", games.len(), elapsed.as_secs_f64());
        selfplay::print_summary(&games);
    }

    match output_path {
        Some(path) => {
            let file = File::create(&path).expect("failed to create output file");
            let mut writer = BufWriter::new(file);
            selfplay::write_jsonl(&games, &mut writer).expect("failed to write output");
            if !quiet {
                eprintln!("Wrote {} games to {}", games.len(), path);
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer).expect("failed to write output");
        }
    }

    if games.iter().any(|g| !g.violations.is_empty()) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Flags followed by a value.
const VALUE_FLAGS: [&str; 8] = [
    "--games",
    "--players",
    "--max-turns",
    "--skip",
    "--threads",
    "--seed",
    "--map",
    "--output",
];

/// Sets a numeric config field from its flag.
fn apply_flag(config: &mut SelfPlayConfig, flag: &str, value: &str) -> Result<(), String> {
    match flag {
        "--games" => config.num_games = parse(value)?,
        "--players" => config.players = parse(value)?,
        "--max-turns" => config.max_turns = parse(value)?,
        "--skip" => config.skip_probability = parse(value)?,
        "--threads" => config.threads = parse(value)?,
        "--seed" => config.seed = parse(value)?,
        other => return Err(format!("unknown flag {}", other)),
    }
    Ok(())
}

fn parse<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| e.to_string())
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --players N      Players per game (default: 4)");
    eprintln!("  --max-turns N    Turn at which a game stops (default: 60)");
    eprintln!("  --skip P         Chance of skipping when a move exists (default: 0.1)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --map FILE       JSON map file (default: built-in map)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress summary output");
    eprintln!("  --help           Show this help");
}
