//! Directory of live games.
//!
//! The registry maps game names to the handles of their tasks. Creating or
//! deleting a game takes the write lock; every other request only clones a
//! handle under the read lock and then talks to the game task directly.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::board::{MapGraph, PlayerNumber, Territory, TerritoryId};
use crate::engine::{BoardView, Engine, GameStatus, MoveOutcome, TerritoryView};
use crate::error::{Conflict, GameError};
use crate::resolve::{AllocationSummary, MoveRequest};
use crate::store::GameStore;

use super::actor::{self, GameHandle};

/// Tuning for spawned game tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Base seed for deals. `None` seeds every game from entropy.
    pub seed: Option<u64>,
    /// Bound of each game's request channel.
    pub channel_capacity: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        RegistrySettings {
            seed: None,
            channel_capacity: 64,
        }
    }
}

pub struct GameRegistry {
    map: Arc<MapGraph>,
    store: Arc<dyn GameStore>,
    settings: RegistrySettings,
    games: RwLock<HashMap<String, GameHandle>>,
}

impl GameRegistry {
    pub fn new(map: Arc<MapGraph>, store: Arc<dyn GameStore>, settings: RegistrySettings) -> Self {
        GameRegistry {
            map,
            store,
            settings,
            games: RwLock::new(HashMap::new()),
        }
    }

    pub fn map(&self) -> &MapGraph {
        &self.map
    }

    /// Static map data, in id order.
    pub fn map_territories(&self) -> Vec<Territory> {
        self.map.territories().to_vec()
    }

    /// Creates an empty, unstarted game.
    pub async fn create(&self, name: &str) -> Result<GameStatus, GameError> {
        let mut games = self.games.write().await;
        if games.contains_key(name) {
            return Err(Conflict::GameNameTaken(name.to_string()).into());
        }

        let engine = self.engine_for(name);
        let game = engine.create_game(name);
        if !self.store.insert_new(&game) {
            return Err(Conflict::GameNameTaken(name.to_string()).into());
        }
        let status = engine.status(&game);
        let handle = actor::spawn(game, engine, Arc::clone(&self.store), self.settings.channel_capacity);
        games.insert(name.to_string(), handle);

        info!(game = name, "game created");
        Ok(status)
    }

    /// Removes a game and stops its task once in-flight requests finish.
    ///
    /// The task is stopped before the record is dropped, so no request sent
    /// through a handle cloned earlier can save the game back.
    pub async fn delete(&self, name: &str) -> Result<(), GameError> {
        let mut games = self.games.write().await;
        let had_task = match games.remove(name) {
            Some(handle) => {
                // An already stopped task has nothing left to save.
                let _ = handle.shutdown().await;
                true
            }
            None => false,
        };
        let had_record = self.store.delete(name);
        if !had_task && !had_record {
            return Err(not_found(name));
        }
        info!(game = name, "game deleted");
        Ok(())
    }

    pub async fn join(&self, game: &str, player_name: &str) -> Result<PlayerNumber, GameError> {
        self.handle(game).await?.join(player_name).await
    }

    pub async fn start(&self, game: &str) -> Result<AllocationSummary, GameError> {
        self.handle(game).await?.start().await
    }

    pub async fn status(&self, game: &str) -> Result<GameStatus, GameError> {
        self.handle(game).await?.status().await
    }

    pub async fn skip(&self, game: &str, player: PlayerNumber) -> Result<u8, GameError> {
        self.handle(game).await?.skip(player).await
    }

    pub async fn move_troops(&self, game: &str, request: MoveRequest) -> Result<MoveOutcome, GameError> {
        self.handle(game).await?.move_troops(request).await
    }

    pub async fn board(&self, game: &str, viewer: Option<PlayerNumber>) -> Result<BoardView, GameError> {
        self.handle(game).await?.board(viewer).await
    }

    pub async fn territory(&self, game: &str, id: TerritoryId) -> Result<TerritoryView, GameError> {
        self.handle(game).await?.territory(id).await
    }

    /// Names of all known games, sorted.
    pub async fn names(&self) -> Vec<String> {
        let games = self.games.read().await;
        let mut names = self.store.names();
        names.extend(games.keys().filter(|k| !self.store.exists(k)).cloned());
        names.sort();
        names.dedup();
        names
    }

    /// Finds the task for `name`, spawning one from the store if the game
    /// exists there but has no task yet.
    async fn handle(&self, name: &str) -> Result<GameHandle, GameError> {
        if let Some(handle) = self.games.read().await.get(name) {
            return Ok(handle.clone());
        }

        let mut games = self.games.write().await;
        if let Some(handle) = games.get(name) {
            return Ok(handle.clone());
        }
        let game = self.store.load(name).ok_or_else(|| not_found(name))?;
        let engine = self.engine_for(name);
        let handle = actor::spawn(game, engine, Arc::clone(&self.store), self.settings.channel_capacity);
        games.insert(name.to_string(), handle.clone());
        info!(game = name, "game loaded from store");
        Ok(handle)
    }

    fn engine_for(&self, name: &str) -> Engine {
        let map = Arc::clone(&self.map);
        match self.settings.seed {
            Some(seed) => Engine::with_seed(map, game_seed(seed, name)),
            None => Engine::new(map),
        }
    }
}

/// Mixes the game name into the base seed so games with the same seed
/// still get different deals.
fn game_seed(seed: u64, name: &str) -> u64 {
    name.bytes().fold(seed, |h, b| {
        (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

fn not_found(name: &str) -> GameError {
    GameError::NotFound(format!("game '{}'", name))
}
