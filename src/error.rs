//! Error taxonomy shared by the rules engine and its callers.
//!
//! Every failure is detected before any state is mutated, so none of these
//! errors needs rollback and none is retried.

use crate::board::{PlayerNumber, TerritoryId};

/// Top-level error returned by game operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A referenced game, player or territory does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The action is not allowed for this player right now.
    #[error("forbidden: {0}")]
    Forbidden(#[from] Forbidden),

    /// The request conflicts with the game's lifecycle state.
    #[error("conflict: {0}")]
    Conflict(#[from] Conflict),

    /// The map cannot host the requested game. Indicates a setup bug.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl GameError {
    /// Short machine-readable category, used in protocol responses.
    pub const fn kind(&self) -> &'static str {
        match self {
            GameError::NotFound(_) => "not_found",
            GameError::Forbidden(_) => "forbidden",
            GameError::Conflict(_) => "conflict",
            GameError::Configuration(_) => "configuration",
        }
    }
}

/// Reasons an action is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Forbidden {
    #[error("player {requested} acted out of turn; player {active} is active")]
    NotYourTurn {
        active: PlayerNumber,
        requested: PlayerNumber,
    },

    #[error("territory {0} is not owned by the acting player")]
    NotOwned(TerritoryId),

    #[error("territory {to} is not adjacent to {from}")]
    NotAdjacent { from: TerritoryId, to: TerritoryId },

    #[error("cannot move {requested} troops out of a territory holding {available}")]
    InsufficientTroops { available: u32, requested: u32 },
}

/// Lifecycle conflicts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Conflict {
    #[error("game name '{0}' is taken")]
    GameNameTaken(String),

    #[error("game lobby is full")]
    LobbyFull,

    #[error("player name '{0}' is taken")]
    PlayerNameTaken(String),

    #[error("the game has already started")]
    AlreadyStarted,

    #[error("the game has not started")]
    NotStarted,

    #[error("at least {required} players are needed to start, found {found}")]
    NotEnoughPlayers { required: usize, found: usize },
}

/// The map and player count do not fit together.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{players} players need {needed} depot bundles but the map has {available}")]
    NotEnoughDepots {
        players: usize,
        needed: usize,
        available: usize,
    },

    #[error("cannot allocate starting positions without players")]
    NoPlayers,

    #[error("starting bundles around depots {first} and {second} both claim territory {territory}")]
    OverlappingBundles {
        first: TerritoryId,
        second: TerritoryId,
        territory: TerritoryId,
    },
}
