//! Supplyline -- a turn-based territory game server speaking a line protocol.
//!
//! This binary reads commands from stdin and writes one JSON response per
//! line to stdout. Logs go to stderr.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use supplyline::config::Config;
use supplyline::protocol::{dispatch, parse_command, Command, Response};
use supplyline::server::GameRegistry;
use supplyline::store::MemoryStore;

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("supplyline=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let map = match config.map() {
        Ok(m) => Arc::new(m),
        Err(e) => {
            error!(error = %e, "failed to load map");
            return ExitCode::FAILURE;
        }
    };

    info!(
        map = map.name(),
        territories = map.len(),
        seed = ?config.seed,
        "supplyline ready"
    );

    let registry = GameRegistry::new(map, Arc::new(MemoryStore::new()), config.registry_settings());
    let mut lines = BufReader::new(io::stdin()).lines();
    let stdout = std::io::stdout();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to read stdin");
                break;
            }
        };

        let (response, quit) = match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => (Response::ok(), true),
            Ok(Some(cmd)) => (dispatch(&registry, cmd).await, false),
            Err(e) => (Response::invalid_command(&e), false),
        };

        let mut out = stdout.lock();
        if writeln!(out, "{}", response.to_line()).and_then(|_| out.flush()).is_err() {
            break;
        }
        if quit {
            break;
        }
    }

    ExitCode::SUCCESS
}
