//! Ownership ledger: the mutable per-game board state.
//!
//! One `OwnedTerritory` per map territory, keyed by territory id. The ledger
//! is created unowned when a game is created and mutated by allocation,
//! troop movement and supply recomputation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::map::MapGraph;
use super::state::PlayerNumber;
use super::territory::TerritoryId;

/// Per-game state of a single territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedTerritory {
    pub territory_id: TerritoryId,
    pub name: String,
    /// Owning player, or None while unclaimed.
    pub owner: Option<PlayerNumber>,
    pub troops: u32,
    /// Set once at game start, never cleared.
    pub supply_depot: bool,
    /// Recomputed by the supply engine.
    pub supplied: bool,
}

impl OwnedTerritory {
    /// An unclaimed territory with no troops.
    pub fn unowned(territory_id: TerritoryId, name: impl Into<String>) -> Self {
        OwnedTerritory {
            territory_id,
            name: name.into(),
            owner: None,
            troops: 0,
            supply_depot: false,
            supplied: false,
        }
    }

    /// Returns true if the given player owns this territory.
    pub fn is_owned_by(&self, player: PlayerNumber) -> bool {
        self.owner == Some(player)
    }
}

/// Territory id -> owned territory, iterated in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    territories: BTreeMap<TerritoryId, OwnedTerritory>,
}

impl Ledger {
    /// Creates an unowned ledger row for every territory on the map.
    pub fn for_map(map: &MapGraph) -> Self {
        let territories = map
            .territories()
            .iter()
            .map(|t| (t.id, OwnedTerritory::unowned(t.id, t.name.clone())))
            .collect();
        Ledger { territories }
    }

    /// Builds a ledger from explicit rows. Later rows replace earlier ones
    /// with the same id.
    pub fn from_territories(rows: impl IntoIterator<Item = OwnedTerritory>) -> Self {
        let territories = rows.into_iter().map(|t| (t.territory_id, t)).collect();
        Ledger { territories }
    }

    pub fn len(&self) -> usize {
        self.territories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    pub fn get(&self, id: TerritoryId) -> Option<&OwnedTerritory> {
        self.territories.get(&id)
    }

    pub fn get_mut(&mut self, id: TerritoryId) -> Option<&mut OwnedTerritory> {
        self.territories.get_mut(&id)
    }

    pub fn contains(&self, id: TerritoryId) -> bool {
        self.territories.contains_key(&id)
    }

    /// All rows in territory id order.
    pub fn iter(&self) -> impl Iterator<Item = &OwnedTerritory> {
        self.territories.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OwnedTerritory> {
        self.territories.values_mut()
    }

    /// Territories owned by the given player.
    pub fn owned_by(&self, player: PlayerNumber) -> impl Iterator<Item = &OwnedTerritory> {
        self.iter().filter(move |t| t.is_owned_by(player))
    }

    /// Ids of every supply depot, in id order.
    pub fn depots(&self) -> Vec<TerritoryId> {
        self.iter()
            .filter(|t| t.supply_depot)
            .map(|t| t.territory_id)
            .collect()
    }

    /// Total troops across the board.
    pub fn total_troops(&self) -> u32 {
        self.iter().map(|t| t.troops).sum()
    }

    /// Total troops held by one player.
    pub fn troops_of(&self, player: PlayerNumber) -> u32 {
        self.owned_by(player).map(|t| t.troops).sum()
    }

    /// Number of supplied territories.
    pub fn supplied_count(&self) -> usize {
        self.iter().filter(|t| t.supplied).count()
    }
}
