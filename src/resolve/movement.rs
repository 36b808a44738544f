//! Troop movement between adjacent territories.
//!
//! A move is checked in full before anything changes: the mover must be the
//! active player, must own both ends, the ends must be neighbors, and at
//! least one troop must stay behind. A successful move spends one action.

use serde::{Deserialize, Serialize};

use crate::board::{Game, MapGraph, PlayerNumber, TerritoryId};
use crate::error::{Forbidden, GameError};

use super::turn::{consume_action, ensure_active};

/// A request to move troops from one territory to a neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub player: PlayerNumber,
    pub from: TerritoryId,
    pub to: TerritoryId,
    pub troops: u32,
}

/// Checks a move against the current state without mutating it.
pub fn validate_move(map: &MapGraph, game: &Game, request: &MoveRequest) -> Result<(), GameError> {
    ensure_active(game, request.player)?;

    let owned = |id: TerritoryId| {
        game.ledger
            .get(id)
            .filter(|t| t.is_owned_by(request.player))
            .ok_or(Forbidden::NotOwned(id))
    };
    let from = owned(request.from)?;
    owned(request.to)?;

    if !map.is_adjacent(request.from, request.to) {
        return Err(Forbidden::NotAdjacent {
            from: request.from,
            to: request.to,
        }
        .into());
    }

    if from.troops <= request.troops {
        return Err(Forbidden::InsufficientTroops {
            available: from.troops,
            requested: request.troops,
        }
        .into());
    }

    Ok(())
}

/// Moves troops and spends an action. Returns the actions left this turn.
pub fn move_troops(map: &MapGraph, game: &mut Game, request: &MoveRequest) -> Result<u8, GameError> {
    validate_move(map, game, request)?;

    if let Some(from) = game.ledger.get_mut(request.from) {
        from.troops -= request.troops;
    }
    if let Some(to) = game.ledger.get_mut(request.to) {
        to.troops += request.troops;
    }

    consume_action(game, request.player)
}
