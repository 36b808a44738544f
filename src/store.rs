//! Game persistence.
//!
//! A `GameStore` loads and saves whole games; one game is the unit of
//! atomicity. The in-memory store backs the server and the tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::board::Game;

/// Whole-game persistence, shared between game actors.
pub trait GameStore: Send + Sync {
    /// Returns a snapshot of the named game.
    fn load(&self, name: &str) -> Option<Game>;

    /// Replaces the stored snapshot of `game`.
    fn save(&self, game: &Game);

    /// Removes a game. Returns false if it did not exist.
    fn delete(&self, name: &str) -> bool;

    fn exists(&self, name: &str) -> bool;

    /// Inserts `game` unless a game with the same name exists.
    /// Returns false, leaving the store untouched, on a name clash.
    fn insert_new(&self, game: &Game) -> bool;

    /// Names of all stored games.
    fn names(&self) -> Vec<String>;
}

/// Keeps games in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: Mutex<HashMap<String, Game>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn games(&self) -> MutexGuard<'_, HashMap<String, Game>> {
        // Every write replaces a whole entry, so a poisoned map is still consistent.
        self.games.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GameStore for MemoryStore {
    fn load(&self, name: &str) -> Option<Game> {
        self.games().get(name).cloned()
    }

    fn save(&self, game: &Game) {
        self.games().insert(game.name.clone(), game.clone());
    }

    fn delete(&self, name: &str) -> bool {
        self.games().remove(name).is_some()
    }

    fn exists(&self, name: &str) -> bool {
        self.games().contains_key(name)
    }

    fn insert_new(&self, game: &Game) -> bool {
        let mut games = self.games();
        if games.contains_key(&game.name) {
            return false;
        }
        games.insert(game.name.clone(), game.clone());
        true
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.games().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MapGraph;

    #[test]
    fn save_load_delete() {
        let map = MapGraph::standard();
        let store = MemoryStore::new();
        let mut game = Game::new("Excalibur", &map);
        assert!(!store.exists("Excalibur"));
        assert!(store.insert_new(&game));
        assert!(!store.insert_new(&game));

        game.add_player("alice").unwrap();
        store.save(&game);
        assert_eq!(store.load("Excalibur"), Some(game));
        assert_eq!(store.names(), vec!["Excalibur".to_string()]);

        assert!(store.delete("Excalibur"));
        assert!(!store.delete("Excalibur"));
        assert!(store.load("Excalibur").is_none());
    }
}
