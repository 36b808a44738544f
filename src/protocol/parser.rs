//! Line command parser.
//!
//! Turns one line of client input into a structured `Command` the server
//! loop can dispatch on. Tokens are separated by whitespace; game and
//! player names are single tokens.

use tracing::warn;

use crate::board::{PlayerNumber, TerritoryId};

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an empty game.
    Create { game: String },

    /// Delete a game and its state.
    Delete { game: String },

    /// Take the next free seat in a game.
    Join { game: String, name: String },

    /// Deal starting positions and begin play.
    Start { game: String },

    /// Report whether a game has started.
    Status { game: String },

    /// Spend one action doing nothing.
    Skip { game: String, player: PlayerNumber },

    /// Move troops between two adjacent owned territories.
    Move {
        game: String,
        player: PlayerNumber,
        from: TerritoryId,
        to: TerritoryId,
        troops: u32,
    },

    /// Show the board, optionally on behalf of one player.
    Board { game: String, player: Option<PlayerNumber> },

    /// Show one territory and its neighbors.
    Territory { game: String, id: TerritoryId },

    /// Dump the static map.
    Map,

    /// Stop the server.
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("malformed {command}: expected '{usage}'")]
    Malformed {
        command: &'static str,
        usage: &'static str,
    },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

/// Parses a single line of input into a `Command`.
///
/// Returns `Ok(None)` for blank lines. Unknown commands and malformed
/// arguments are logged and returned as errors.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(None);
    };
    let args = &tokens[1..];

    let parsed = match head {
        "create" => one_name(args, "create", "create <game>").map(|game| Command::Create { game }),
        "delete" => one_name(args, "delete", "delete <game>").map(|game| Command::Delete { game }),
        "start" => one_name(args, "start", "start <game>").map(|game| Command::Start { game }),
        "status" => one_name(args, "status", "status <game>").map(|game| Command::Status { game }),
        "join" => parse_join(args),
        "skip" => parse_skip(args),
        "move" => parse_move(args),
        "board" => parse_board(args),
        "territory" => parse_territory(args),
        "map" if args.is_empty() => Ok(Command::Map),
        "map" => Err(ParseError::Malformed {
            command: "map",
            usage: "map",
        }),
        "quit" => Ok(Command::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    };

    match parsed {
        Ok(cmd) => Ok(Some(cmd)),
        Err(e) => {
            warn!(line = line.trim(), error = %e, "rejected command");
            Err(e)
        }
    }
}

fn one_name(args: &[&str], command: &'static str, usage: &'static str) -> Result<String, ParseError> {
    match args {
        [game] => Ok(game.to_string()),
        _ => Err(ParseError::Malformed { command, usage }),
    }
}

/// Parses `join <game> <name>`.
fn parse_join(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [game, name] => Ok(Command::Join {
            game: game.to_string(),
            name: name.to_string(),
        }),
        _ => Err(ParseError::Malformed {
            command: "join",
            usage: "join <game> <name>",
        }),
    }
}

/// Parses `skip <game> <player>`.
fn parse_skip(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [game, player] => Ok(Command::Skip {
            game: game.to_string(),
            player: PlayerNumber(number(player)?),
        }),
        _ => Err(ParseError::Malformed {
            command: "skip",
            usage: "skip <game> <player>",
        }),
    }
}

/// Parses `move <game> <player> <from> <to> <troops>`.
fn parse_move(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [game, player, from, to, troops] => Ok(Command::Move {
            game: game.to_string(),
            player: PlayerNumber(number(player)?),
            from: TerritoryId(number(from)?),
            to: TerritoryId(number(to)?),
            troops: number(troops)?,
        }),
        _ => Err(ParseError::Malformed {
            command: "move",
            usage: "move <game> <player> <from> <to> <troops>",
        }),
    }
}

/// Parses `board <game> [player]`.
fn parse_board(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [game] => Ok(Command::Board {
            game: game.to_string(),
            player: None,
        }),
        [game, player] => Ok(Command::Board {
            game: game.to_string(),
            player: Some(PlayerNumber(number(player)?)),
        }),
        _ => Err(ParseError::Malformed {
            command: "board",
            usage: "board <game> [player]",
        }),
    }
}

/// Parses `territory <game> <id>`.
fn parse_territory(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [game, id] => Ok(Command::Territory {
            game: game.to_string(),
            id: TerritoryId(number(id)?),
        }),
        _ => Err(ParseError::Malformed {
            command: "territory",
            usage: "territory <game> <id>",
        }),
    }
}

fn number<T: std::str::FromStr>(token: &str) -> Result<T, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::InvalidNumber(token.to_string()))
}
