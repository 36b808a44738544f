//! Territory definitions and the built-in standard map.
//!
//! The standard map is a 6x6 grid of 36 territories numbered row-major from
//! the north-west corner. Neighbor ids are derived from grid position at
//! compile time, so the table only records names and supply ranks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a territory on a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerritoryId(pub u32);

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A compass direction on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in the order neighbors are listed.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the direction pointing back the other way.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// The four optional neighbors of a territory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighbors {
    pub north: Option<TerritoryId>,
    pub east: Option<TerritoryId>,
    pub south: Option<TerritoryId>,
    pub west: Option<TerritoryId>,
}

impl Neighbors {
    /// Returns the neighbor in the given direction.
    pub const fn get(&self, direction: Direction) -> Option<TerritoryId> {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    /// Iterates over the present neighbors, skipping empty slots.
    pub fn iter(&self) -> impl Iterator<Item = TerritoryId> + '_ {
        Direction::ALL.into_iter().filter_map(|d| self.get(d))
    }

    /// Number of present neighbors.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Returns true if `id` is one of the four neighbors.
    pub fn contains(&self, id: TerritoryId) -> bool {
        self.iter().any(|n| n == id)
    }
}

/// A territory on a map: static reference data shared by every game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    #[serde(flatten)]
    pub neighbors: Neighbors,
    /// Supply-eligibility rank: 0 never hosts a depot, otherwise the
    /// territory is a depot in games with at least this many players.
    #[serde(default)]
    pub supply: u8,
}

impl Territory {
    /// Returns true if this territory is a depot for the given player count.
    pub const fn is_depot_eligible(&self, player_count: usize) -> bool {
        self.supply != 0 && (self.supply as usize) <= player_count
    }
}

/// Compile-time metadata for one cell of the standard grid.
#[derive(Debug, Clone, Copy)]
pub struct TerritoryInfo {
    pub id: u32,
    pub name: &'static str,
    pub supply: u8,
    pub neighbors: [Option<u32>; 4],
}

/// Width and height of the standard grid.
pub const GRID_SIZE: u32 = 6;

/// Number of territories on the standard map.
pub const STANDARD_TERRITORY_COUNT: usize = (GRID_SIZE * GRID_SIZE) as usize;

/// Largest player count the standard map has depots for.
pub const STANDARD_MAX_PLAYERS: usize = 4;

/// Builds a grid cell, deriving its north/east/south/west neighbors.
const fn cell(id: u32, name: &'static str, supply: u8) -> TerritoryInfo {
    let row = (id - 1) / GRID_SIZE;
    let col = (id - 1) % GRID_SIZE;
    TerritoryInfo {
        id,
        name,
        supply,
        neighbors: [
            if row > 0 { Some(id - GRID_SIZE) } else { None },
            if col + 1 < GRID_SIZE { Some(id + 1) } else { None },
            if row + 1 < GRID_SIZE { Some(id + GRID_SIZE) } else { None },
            if col > 0 { Some(id - 1) } else { None },
        ],
    }
}

/// The standard map. Depots are spaced at least three steps apart so that
/// no two starting bundles share a territory.
pub static STANDARD_TERRITORIES: [TerritoryInfo; STANDARD_TERRITORY_COUNT] = [
    cell(1, "Hills 1", 2),
    cell(2, "Hills 2", 0),
    cell(3, "Hills 3", 0),
    cell(4, "Hills 4", 3),
    cell(5, "Hills 5", 0),
    cell(6, "Hills 6", 0),
    cell(7, "Cliffs 1", 0),
    cell(8, "Cliffs 2", 0),
    cell(9, "Cliffs 3", 0),
    cell(10, "Cliffs 4", 0),
    cell(11, "Cliffs 5", 0),
    cell(12, "Cliffs 6", 4),
    cell(13, "Islands 1", 0),
    cell(14, "Islands 2", 2),
    cell(15, "Islands 3", 0),
    cell(16, "Islands 4", 0),
    cell(17, "Islands 5", 0),
    cell(18, "Islands 6", 0),
    cell(19, "Marshes 1", 0),
    cell(20, "Marshes 2", 0),
    cell(21, "Marshes 3", 0),
    cell(22, "Marshes 4", 0),
    cell(23, "Marshes 5", 2),
    cell(24, "Marshes 6", 0),
    cell(25, "Plains 1", 4),
    cell(26, "Plains 2", 0),
    cell(27, "Plains 3", 0),
    cell(28, "Plains 4", 0),
    cell(29, "Plains 5", 0),
    cell(30, "Plains 6", 0),
    cell(31, "Seas 1", 0),
    cell(32, "Seas 2", 0),
    cell(33, "Seas 3", 3),
    cell(34, "Seas 4", 0),
    cell(35, "Seas 5", 0),
    cell(36, "Seas 6", 2),
];

impl TerritoryInfo {
    /// Converts the static metadata into an owned `Territory`.
    pub fn to_territory(&self) -> Territory {
        let [north, east, south, west] = self.neighbors.map(|n| n.map(TerritoryId));
        Territory {
            id: TerritoryId(self.id),
            name: self.name.to_string(),
            neighbors: Neighbors {
                north,
                east,
                south,
                west,
            },
            supply: self.supply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential() {
        for (i, info) in STANDARD_TERRITORIES.iter().enumerate() {
            assert_eq!(info.id as usize, i + 1);
        }
    }

    #[test]
    fn corner_has_two_neighbors() {
        let t = STANDARD_TERRITORIES[0].to_territory();
        assert_eq!(t.neighbors.north, None);
        assert_eq!(t.neighbors.west, None);
        assert_eq!(t.neighbors.east, Some(TerritoryId(2)));
        assert_eq!(t.neighbors.south, Some(TerritoryId(7)));
        assert_eq!(t.neighbors.count(), 2);
    }

    #[test]
    fn interior_has_four_neighbors() {
        let t = STANDARD_TERRITORIES[13].to_territory();
        assert_eq!(t.id, TerritoryId(14));
        assert_eq!(
            t.neighbors.iter().collect::<Vec<_>>(),
            vec![TerritoryId(8), TerritoryId(15), TerritoryId(20), TerritoryId(13)]
        );
    }

    #[test]
    fn depot_eligibility_by_rank() {
        let t = STANDARD_TERRITORIES[3].to_territory();
        assert_eq!(t.supply, 3);
        assert!(!t.is_depot_eligible(2));
        assert!(t.is_depot_eligible(3));
        assert!(t.is_depot_eligible(4));

        let plain = STANDARD_TERRITORIES[1].to_territory();
        assert!(!plain.is_depot_eligible(4));
    }

    #[test]
    fn enough_depots_for_every_supported_player_count() {
        for players in 2..=STANDARD_MAX_PLAYERS {
            let eligible = STANDARD_TERRITORIES
                .iter()
                .filter(|info| info.to_territory().is_depot_eligible(players))
                .count();
            assert_eq!(eligible, 2 * players, "{} players", players);
        }
    }

    #[test]
    fn direction_opposites() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
        }
    }
}
