//! Randomized starting positions.
//!
//! Every depot-eligible territory forms a starting bundle with its
//! neighbors. Bundles are shuffled and dealt two per player in seat order.
//! A depot starts with 8 troops and its neighbors share 12, so every
//! player begins with the same army regardless of where it lands.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::board::{Ledger, MapGraph, PlayerNumber, TerritoryId};
use crate::error::ConfigurationError;

/// Troops placed on each starting depot.
pub const DEPOT_TROOPS: u32 = 8;

/// Troops split between the territories surrounding a starting depot.
pub const SURROUNDING_TROOPS: u32 = 12;

/// Bundles dealt to each player.
pub const BUNDLES_PER_PLAYER: usize = 2;

/// A depot and the territories around it, dealt as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartingLocation {
    pub depot: TerritoryId,
    pub surrounding: Vec<TerritoryId>,
}

impl StartingLocation {
    /// Troops placed on each surrounding territory.
    pub fn troops_per_surrounding(&self) -> u32 {
        match self.surrounding.len() {
            0 => 0,
            n => SURROUNDING_TROOPS / n as u32,
        }
    }
}

/// Depots dealt to each player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocationSummary {
    pub depots: Vec<(PlayerNumber, TerritoryId)>,
}

impl AllocationSummary {
    /// Depots dealt to one player.
    pub fn depots_of(&self, player: PlayerNumber) -> Vec<TerritoryId> {
        self.depots
            .iter()
            .filter(|(p, _)| *p == player)
            .map(|&(_, d)| d)
            .collect()
    }
}

/// Builds one bundle per depot-eligible territory, in map order.
pub fn starting_locations(map: &MapGraph, ledger: &Ledger, player_count: usize) -> Vec<StartingLocation> {
    map.depot_candidates(player_count)
        .into_iter()
        .filter(|depot| ledger.contains(*depot))
        .map(|depot| {
            let mut surrounding: Vec<TerritoryId> = Vec::new();
            if let Some(neighbors) = map.neighbors(depot) {
                for id in neighbors.iter() {
                    if ledger.contains(id) && !surrounding.contains(&id) {
                        surrounding.push(id);
                    }
                }
            }
            StartingLocation { depot, surrounding }
        })
        .collect()
}

/// Deals starting positions to `players` and seeds the ledger.
///
/// Fails without touching the ledger when the map offers fewer than two
/// bundles per player, or when any two bundles share a territory.
pub fn allocate_starting_positions(
    map: &MapGraph,
    ledger: &mut Ledger,
    players: &[PlayerNumber],
    rng: &mut impl Rng,
) -> Result<AllocationSummary, ConfigurationError> {
    if players.is_empty() {
        return Err(ConfigurationError::NoPlayers);
    }

    let mut locations = starting_locations(map, ledger, players.len());
    let needed = BUNDLES_PER_PLAYER * players.len();
    if locations.len() < needed {
        return Err(ConfigurationError::NotEnoughDepots {
            players: players.len(),
            needed,
            available: locations.len(),
        });
    }

    ensure_disjoint(&locations)?;

    locations.shuffle(rng);
    let mut deck = locations.into_iter();
    let mut summary = AllocationSummary::default();

    for &player in players {
        for location in deck.by_ref().take(BUNDLES_PER_PLAYER) {
            claim(ledger, &location, player);
            summary.depots.push((player, location.depot));
        }
    }

    debug!(players = players.len(), depots = summary.depots.len(), "starting positions dealt");
    Ok(summary)
}

/// Every territory may belong to at most one bundle, otherwise a later claim
/// would take land from an earlier player.
fn ensure_disjoint(locations: &[StartingLocation]) -> Result<(), ConfigurationError> {
    let mut claimed: HashMap<TerritoryId, TerritoryId> = HashMap::new();
    for location in locations {
        let members = std::iter::once(location.depot).chain(location.surrounding.iter().copied());
        for territory in members {
            if let Some(&first) = claimed.get(&territory) {
                return Err(ConfigurationError::OverlappingBundles {
                    first,
                    second: location.depot,
                    territory,
                });
            }
            claimed.insert(territory, location.depot);
        }
    }
    Ok(())
}

/// Hands a bundle to a player.
fn claim(ledger: &mut Ledger, location: &StartingLocation, player: PlayerNumber) {
    if let Some(depot) = ledger.get_mut(location.depot) {
        depot.owner = Some(player);
        depot.troops = DEPOT_TROOPS;
        depot.supply_depot = true;
    }
    let troops = location.troops_per_surrounding();
    for &id in &location.surrounding {
        if let Some(t) = ledger.get_mut(id) {
            t.owner = Some(player);
            t.troops = troops;
        }
    }
}
