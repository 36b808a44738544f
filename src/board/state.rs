//! Game state representation.
//!
//! Holds the complete snapshot of one game: its players, turn counter,
//! started flag and ownership ledger. A `Game` is the unit the store loads
//! and saves atomically.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ledger::Ledger;
use super::map::MapGraph;
use crate::error::Conflict;
use crate::resolve::turn::{active_player, ACTIONS_PER_TURN};

/// Maximum number of players that may join a game.
pub const MAX_PLAYERS: usize = 4;

/// Minimum number of players required to start a game.
pub const MIN_PLAYERS: usize = 2;

/// 1-based seat number of a player, used as the turn-rotation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerNumber(pub u8);

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player seated in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub number: PlayerNumber,
    /// Actions left in the current turn, in `0..=3`.
    pub remaining_actions: u8,
}

impl Player {
    pub fn new(name: impl Into<String>, number: PlayerNumber) -> Self {
        Player {
            name: name.into(),
            number,
            remaining_actions: ACTIONS_PER_TURN,
        }
    }
}

/// Complete state of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub name: String,
    /// Players in seat order.
    pub players: Vec<Player>,
    pub started: bool,
    /// Starts at 1 and only moves forward.
    pub turn_number: u32,
    pub ledger: Ledger,
}

impl Game {
    /// Creates an unstarted game with an unowned ledger row per map territory.
    pub fn new(name: impl Into<String>, map: &MapGraph) -> Self {
        Game {
            name: name.into(),
            players: Vec::new(),
            started: false,
            turn_number: 1,
            ledger: Ledger::for_map(map),
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Seat numbers in order.
    pub fn player_numbers(&self) -> Vec<PlayerNumber> {
        self.players.iter().map(|p| p.number).collect()
    }

    pub fn player(&self, number: PlayerNumber) -> Option<&Player> {
        self.players.iter().find(|p| p.number == number)
    }

    pub fn player_mut(&mut self, number: PlayerNumber) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.number == number)
    }

    /// The player allowed to act this turn, or None for a game without players.
    pub fn active_player(&self) -> Option<PlayerNumber> {
        if self.players.is_empty() {
            return None;
        }
        Some(active_player(self.turn_number, self.players.len()))
    }

    /// Seats a new player, returning its number.
    ///
    /// Numbers are handed out as `count + 1`. Joining is refused once the
    /// game has started, when the lobby is full, or when the name is taken.
    pub fn add_player(&mut self, name: &str) -> Result<PlayerNumber, Conflict> {
        if self.started {
            return Err(Conflict::AlreadyStarted);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(Conflict::LobbyFull);
        }
        if self.players.iter().any(|p| p.name == name) {
            return Err(Conflict::PlayerNameTaken(name.to_string()));
        }
        // MAX_PLAYERS fits in a u8, so the cast cannot truncate.
        let number = PlayerNumber(self.players.len() as u8 + 1);
        self.players.push(Player::new(name, number));
        Ok(number)
    }
}
