//! Board representation and game-state types.
//!
//! Contains the static map graph, the per-game ownership ledger, and the
//! player and game records that wrap it.

pub mod ledger;
pub mod map;
pub mod state;
pub mod territory;

pub use ledger::{Ledger, OwnedTerritory};
pub use map::{MapError, MapGraph};
pub use state::{Game, Player, PlayerNumber, MAX_PLAYERS, MIN_PLAYERS};
pub use territory::{
    Direction, Neighbors, Territory, TerritoryId, TerritoryInfo, STANDARD_MAX_PLAYERS,
    STANDARD_TERRITORIES, STANDARD_TERRITORY_COUNT,
};
