//! The map graph: territories and their north/east/south/west adjacency.
//!
//! A `MapGraph` is validated on construction and read-only afterwards, so it
//! can be shared between games behind an `Arc`. Maps come either from the
//! built-in standard table or from a JSON file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::territory::{Direction, Neighbors, Territory, TerritoryId, STANDARD_TERRITORIES};

/// Errors that can occur while building or loading a map.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("map has no territories")]
    Empty,

    #[error("duplicate territory id {0}")]
    DuplicateId(TerritoryId),

    #[error("territory {0} lists itself as a neighbor")]
    SelfNeighbor(TerritoryId),

    #[error("territory {from} refers to unknown neighbor {to}")]
    UnknownNeighbor { from: TerritoryId, to: TerritoryId },

    #[error("territory {from} has {to} to the {direction:?} but {to} does not point back")]
    Asymmetric {
        from: TerritoryId,
        to: TerritoryId,
        direction: Direction,
    },

    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse map JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk shape of a map file.
#[derive(Debug, Serialize, Deserialize)]
struct MapFile {
    name: String,
    territories: Vec<Territory>,
}

/// Read-only map graph.
#[derive(Debug, Clone)]
pub struct MapGraph {
    name: String,
    territories: Vec<Territory>,
    index: HashMap<TerritoryId, usize>,
}

impl MapGraph {
    /// Builds a map from territories, validating ids and adjacency.
    pub fn new(name: impl Into<String>, territories: Vec<Territory>) -> Result<Self, MapError> {
        if territories.is_empty() {
            return Err(MapError::Empty);
        }

        let mut index = HashMap::with_capacity(territories.len());
        for (i, t) in territories.iter().enumerate() {
            if index.insert(t.id, i).is_some() {
                return Err(MapError::DuplicateId(t.id));
            }
        }

        for t in &territories {
            for direction in Direction::ALL {
                let Some(to) = t.neighbors.get(direction) else {
                    continue;
                };
                if to == t.id {
                    return Err(MapError::SelfNeighbor(t.id));
                }
                let other = index
                    .get(&to)
                    .map(|&i| &territories[i])
                    .ok_or(MapError::UnknownNeighbor { from: t.id, to })?;
                if other.neighbors.get(direction.opposite()) != Some(t.id) {
                    return Err(MapError::Asymmetric {
                        from: t.id,
                        to,
                        direction,
                    });
                }
            }
        }

        Ok(MapGraph {
            name: name.into(),
            territories,
            index,
        })
    }

    /// The built-in 6x6 map, playable by 2 to 4 players.
    pub fn standard() -> Self {
        let territories = STANDARD_TERRITORIES.iter().map(|info| info.to_territory()).collect();
        let index = STANDARD_TERRITORIES
            .iter()
            .enumerate()
            .map(|(i, info)| (TerritoryId(info.id), i))
            .collect();
        MapGraph {
            name: "standard".to_string(),
            territories,
            index,
        }
    }

    /// Parses and validates a map from JSON.
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        let file: MapFile = serde_json::from_str(json)?;
        MapGraph::new(file.name, file.territories)
    }

    /// Reads, parses and validates a map file.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let data = std::fs::read_to_string(path)?;
        MapGraph::from_json(&data)
    }

    /// Serializes the map back into its file format.
    pub fn to_json(&self) -> Result<String, MapError> {
        let file = MapFile {
            name: self.name.clone(),
            territories: self.territories.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of territories on the map.
    pub fn len(&self) -> usize {
        self.territories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// All territories in map order.
    pub fn territories(&self) -> &[Territory] {
        &self.territories
    }

    /// Looks up a territory by id.
    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.index.get(&id).map(|&i| &self.territories[i])
    }

    /// Returns the neighbors of a territory, or None for an unknown id.
    pub fn neighbors(&self, id: TerritoryId) -> Option<Neighbors> {
        self.territory(id).map(|t| t.neighbors)
    }

    /// Returns true if `to` is one of the four neighbors of `from`.
    pub fn is_adjacent(&self, from: TerritoryId, to: TerritoryId) -> bool {
        self.neighbors(from).is_some_and(|n| n.contains(to))
    }

    /// Returns true if the territory hosts a supply depot for this player count.
    pub fn is_depot_eligible(&self, id: TerritoryId, player_count: usize) -> bool {
        self.territory(id)
            .is_some_and(|t| t.is_depot_eligible(player_count))
    }

    /// Depot-eligible territories for the given player count, in map order.
    pub fn depot_candidates(&self, player_count: usize) -> Vec<TerritoryId> {
        self.territories
            .iter()
            .filter(|t| t.is_depot_eligible(player_count))
            .map(|t| t.id)
            .collect()
    }
}
