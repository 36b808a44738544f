//! Game orchestration.
//!
//! Wraps the rule modules into the operations a game goes through: create,
//! join, start, skip, move, and read-only board views. The engine owns the
//! shared map and the random source used to deal starting positions; the
//! game state itself is passed in by the caller.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::board::{Game, MapGraph, OwnedTerritory, PlayerNumber, TerritoryId, MIN_PLAYERS};
use crate::error::{Conflict, GameError};
use crate::resolve::{
    allocate_starting_positions, consume_action, move_troops, recompute_supply, AllocationSummary,
    MoveRequest,
};

/// Lifecycle summary of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStatus {
    pub name: String,
    pub started: bool,
    pub players: usize,
    pub turn_number: u32,
}

/// Per-player totals shown on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub name: String,
    pub player_number: PlayerNumber,
    pub troops: u32,
    pub territories: usize,
    pub supply_depots: usize,
}

/// Everything a client needs to draw the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    /// The player the view was requested for, if any.
    pub player_number: Option<PlayerNumber>,
    pub turn_number: u32,
    pub active_player: Option<PlayerNumber>,
    /// Actions the active player has left this turn.
    pub remaining_actions: Option<u8>,
    pub players: Vec<PlayerSummary>,
    pub territories: Vec<OwnedTerritory>,
}

/// Result of a successful troop move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub actions_remaining: u8,
    pub territories: Vec<OwnedTerritory>,
}

/// A neighbor as shown in a territory view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborView {
    pub territory_id: TerritoryId,
    pub name: String,
}

/// Static details of one territory in the context of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerritoryView {
    pub territory_id: TerritoryId,
    pub name: String,
    /// Whether the territory hosts a depot at this game's player count.
    pub supply: bool,
    pub north: Option<NeighborView>,
    pub east: Option<NeighborView>,
    pub south: Option<NeighborView>,
    pub west: Option<NeighborView>,
}

/// Applies game operations against a shared map.
pub struct Engine {
    map: Arc<MapGraph>,
    rng: SmallRng,
}

impl Engine {
    /// Creates an engine seeded from entropy.
    pub fn new(map: Arc<MapGraph>) -> Self {
        Engine {
            map,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Creates an engine with a fixed seed, for reproducible deals.
    pub fn with_seed(map: Arc<MapGraph>, seed: u64) -> Self {
        Engine {
            map,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn map(&self) -> &MapGraph {
        &self.map
    }

    /// Creates an unstarted game over this engine's map.
    pub fn create_game(&self, name: &str) -> Game {
        Game::new(name, &self.map)
    }

    /// Seats a player in an unstarted game.
    pub fn join(&self, game: &mut Game, player_name: &str) -> Result<PlayerNumber, GameError> {
        let number = game.add_player(player_name)?;
        info!(game = %game.name, player = %number, name = player_name, "player joined");
        Ok(number)
    }

    /// Starts a game: deals starting positions and computes initial supply.
    pub fn start(&mut self, game: &mut Game) -> Result<AllocationSummary, GameError> {
        if game.started {
            return Err(Conflict::AlreadyStarted.into());
        }
        if game.player_count() < MIN_PLAYERS {
            return Err(Conflict::NotEnoughPlayers {
                required: MIN_PLAYERS,
                found: game.player_count(),
            }
            .into());
        }

        let players = game.player_numbers();
        let summary = allocate_starting_positions(&self.map, &mut game.ledger, &players, &mut self.rng)?;
        let supplied = recompute_supply(&self.map, &mut game.ledger);
        game.started = true;

        info!(
            game = %game.name,
            players = players.len(),
            supplied,
            "game started"
        );
        Ok(summary)
    }

    /// Spends one action without doing anything else.
    pub fn skip(&self, game: &mut Game, player: PlayerNumber) -> Result<u8, GameError> {
        ensure_started(game)?;
        let remaining = consume_action(game, player)?;
        debug!(game = %game.name, player = %player, remaining, turn = game.turn_number, "action skipped");
        Ok(remaining)
    }

    /// Moves troops, spends an action and refreshes supply.
    pub fn move_troops(&self, game: &mut Game, request: &MoveRequest) -> Result<MoveOutcome, GameError> {
        ensure_started(game)?;
        let actions_remaining = move_troops(&self.map, game, request)?;
        recompute_supply(&self.map, &mut game.ledger);
        debug!(
            game = %game.name,
            player = %request.player,
            from = %request.from,
            to = %request.to,
            troops = request.troops,
            actions_remaining,
            "troops moved"
        );
        Ok(MoveOutcome {
            actions_remaining,
            territories: game.ledger.iter().cloned().collect(),
        })
    }

    /// Summarizes a game's lifecycle state.
    pub fn status(&self, game: &Game) -> GameStatus {
        GameStatus {
            name: game.name.clone(),
            started: game.started,
            players: game.player_count(),
            turn_number: game.turn_number,
        }
    }

    /// Builds the board view, optionally on behalf of one player.
    pub fn board(&self, game: &Game, viewer: Option<PlayerNumber>) -> BoardView {
        let players = game
            .players
            .iter()
            .map(|p| {
                let owned: Vec<&OwnedTerritory> = game.ledger.owned_by(p.number).collect();
                PlayerSummary {
                    name: p.name.clone(),
                    player_number: p.number,
                    troops: owned.iter().map(|t| t.troops).sum(),
                    territories: owned.len(),
                    supply_depots: owned.iter().filter(|t| t.supply_depot).count(),
                }
            })
            .collect();

        let active_player = game.active_player();
        BoardView {
            player_number: viewer,
            turn_number: game.turn_number,
            active_player,
            remaining_actions: active_player
                .and_then(|n| game.player(n))
                .map(|p| p.remaining_actions),
            players,
            territories: game.ledger.iter().cloned().collect(),
        }
    }

    /// Describes one territory and its neighbors.
    pub fn territory(&self, game: &Game, id: TerritoryId) -> Result<TerritoryView, GameError> {
        let territory = self
            .map
            .territory(id)
            .ok_or_else(|| GameError::NotFound(format!("territory {}", id)))?;

        let neighbor = |slot: Option<TerritoryId>| {
            slot.and_then(|n| self.map.territory(n)).map(|t| NeighborView {
                territory_id: t.id,
                name: t.name.clone(),
            })
        };

        Ok(TerritoryView {
            territory_id: territory.id,
            name: territory.name.clone(),
            supply: territory.is_depot_eligible(game.player_count()),
            north: neighbor(territory.neighbors.north),
            east: neighbor(territory.neighbors.east),
            south: neighbor(territory.neighbors.south),
            west: neighbor(territory.neighbors.west),
        })
    }
}

fn ensure_started(game: &Game) -> Result<(), GameError> {
    if !game.started {
        return Err(Conflict::NotStarted.into());
    }
    Ok(())
}
