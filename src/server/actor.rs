//! One task per game.
//!
//! Each live game is owned by a tokio task that drains a request channel,
//! so requests against the same game run strictly one after another while
//! different games run side by side. Callers talk to the task through a
//! cloneable `GameHandle`.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::board::{Game, PlayerNumber, TerritoryId};
use crate::engine::{BoardView, Engine, GameStatus, MoveOutcome, TerritoryView};
use crate::error::GameError;
use crate::resolve::{AllocationSummary, MoveRequest};
use crate::store::GameStore;

type Reply<T> = oneshot::Sender<Result<T, GameError>>;

/// A request processed by a game task.
#[derive(Debug)]
pub enum Request {
    Join { name: String, reply: Reply<PlayerNumber> },
    Start { reply: Reply<AllocationSummary> },
    Status { reply: Reply<GameStatus> },
    Skip { player: PlayerNumber, reply: Reply<u8> },
    Move { request: MoveRequest, reply: Reply<MoveOutcome> },
    Board { viewer: Option<PlayerNumber>, reply: Reply<BoardView> },
    Territory { id: TerritoryId, reply: Reply<TerritoryView> },
    /// Stops the task. Nothing is saved afterwards.
    Shutdown { reply: Reply<()> },
}

/// Cloneable sender side of a game task.
#[derive(Debug, Clone)]
pub struct GameHandle {
    name: String,
    tx: mpsc::Sender<Request>,
}

impl GameHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true once the task has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub async fn join(&self, name: &str) -> Result<PlayerNumber, GameError> {
        let name = name.to_string();
        self.call(|reply| Request::Join { name, reply }).await
    }

    pub async fn start(&self) -> Result<AllocationSummary, GameError> {
        self.call(|reply| Request::Start { reply }).await
    }

    pub async fn status(&self) -> Result<GameStatus, GameError> {
        self.call(|reply| Request::Status { reply }).await
    }

    pub async fn skip(&self, player: PlayerNumber) -> Result<u8, GameError> {
        self.call(|reply| Request::Skip { player, reply }).await
    }

    pub async fn move_troops(&self, request: MoveRequest) -> Result<MoveOutcome, GameError> {
        self.call(|reply| Request::Move { request, reply }).await
    }

    pub async fn board(&self, viewer: Option<PlayerNumber>) -> Result<BoardView, GameError> {
        self.call(|reply| Request::Board { viewer, reply }).await
    }

    pub async fn territory(&self, id: TerritoryId) -> Result<TerritoryView, GameError> {
        self.call(|reply| Request::Territory { id, reply }).await
    }

    /// Stops the task after the requests queued ahead of this one. Later
    /// requests on any clone of this handle fail with `NotFound`.
    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.call(|reply| Request::Shutdown { reply }).await
    }

    /// Sends a request and waits for its reply. A stopped task means the
    /// game was deleted.
    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> Request) -> Result<T, GameError> {
        let gone = || GameError::NotFound(format!("game '{}'", self.name));
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).await.map_err(|_| gone())?;
        rx.await.map_err(|_| gone())?
    }
}

/// State owned by a game task.
struct GameActor {
    game: Game,
    engine: Engine,
    store: Arc<dyn GameStore>,
}

impl GameActor {
    fn handle(&mut self, request: Request) -> ControlFlow<()> {
        match request {
            Request::Join { name, reply } => {
                let result = self.engine.join(&mut self.game, &name);
                self.persist(&result);
                send(reply, result);
            }
            Request::Start { reply } => {
                let result = self.engine.start(&mut self.game);
                self.persist(&result);
                send(reply, result);
            }
            Request::Status { reply } => {
                send(reply, Ok(self.engine.status(&self.game)));
            }
            Request::Skip { player, reply } => {
                let result = self.engine.skip(&mut self.game, player);
                self.persist(&result);
                send(reply, result);
            }
            Request::Move { request, reply } => {
                let result = self.engine.move_troops(&mut self.game, &request);
                self.persist(&result);
                send(reply, result);
            }
            Request::Board { viewer, reply } => {
                send(reply, Ok(self.engine.board(&self.game, viewer)));
            }
            Request::Territory { id, reply } => {
                send(reply, self.engine.territory(&self.game, id));
            }
            Request::Shutdown { reply } => {
                send(reply, Ok(()));
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Saves the game after a successful mutation.
    fn persist<T>(&self, result: &Result<T, GameError>) {
        match result {
            Ok(_) => self.store.save(&self.game),
            Err(e) => debug!(game = %self.game.name, error = %e, "request rejected"),
        }
    }
}

fn send<T>(reply: Reply<T>, result: Result<T, GameError>) {
    if reply.send(result).is_err() {
        warn!("caller went away before the reply was sent");
    }
}

/// Spawns the task that owns `game` and returns its handle.
///
/// The task stops on `shutdown` or when every handle has been dropped.
pub fn spawn(game: Game, engine: Engine, store: Arc<dyn GameStore>, capacity: usize) -> GameHandle {
    let (tx, mut rx) = mpsc::channel(capacity.max(1));
    let name = game.name.clone();
    let mut actor = GameActor { game, engine, store };

    tokio::spawn(async move {
        debug!(game = %actor.game.name, "game task started");
        while let Some(request) = rx.recv().await {
            if actor.handle(request).is_break() {
                break;
            }
        }
        debug!(game = %actor.game.name, "game task stopped");
    });

    GameHandle { name, tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MapGraph;
    use crate::store::MemoryStore;

    fn spawn_game(store: Arc<MemoryStore>) -> GameHandle {
        let map = Arc::new(MapGraph::standard());
        let engine = Engine::with_seed(map, 9);
        let game = engine.create_game("actor");
        store.save(&game);
        spawn(game, engine, store, 8)
    }

    #[tokio::test]
    async fn requests_are_applied_and_persisted() {
        let store = Arc::new(MemoryStore::new());
        let handle = spawn_game(store.clone());

        assert_eq!(handle.join("alice").await, Ok(PlayerNumber(1)));
        assert_eq!(handle.join("bob").await, Ok(PlayerNumber(2)));
        handle.start().await.unwrap();
        assert_eq!(handle.skip(PlayerNumber(1)).await, Ok(2));

        let stored = store.load("actor").unwrap();
        assert!(stored.started);
        assert_eq!(stored.player(PlayerNumber(1)).unwrap().remaining_actions, 2);
        assert_eq!(handle.status().await.unwrap().players, 2);
    }

    #[tokio::test]
    async fn rejected_requests_are_not_persisted() {
        let store = Arc::new(MemoryStore::new());
        let handle = spawn_game(store.clone());
        handle.join("alice").await.unwrap();
        let before = store.load("actor").unwrap();

        assert_eq!(handle.start().await.unwrap_err().kind(), "conflict");
        assert_eq!(handle.join("alice").await.unwrap_err().kind(), "conflict");
        assert_eq!(store.load("actor").unwrap(), before);
    }

    #[tokio::test]
    async fn shutdown_stops_saving() {
        let store = Arc::new(MemoryStore::new());
        let handle = spawn_game(store.clone());
        let other = handle.clone();
        handle.join("alice").await.unwrap();

        handle.shutdown().await.unwrap();
        store.delete("actor");

        assert_eq!(other.join("bob").await.unwrap_err().kind(), "not_found");
        assert_eq!(handle.status().await.unwrap_err().kind(), "not_found");
        assert!(other.is_closed());
        assert!(!store.exists("actor"));
    }

    #[tokio::test]
    async fn read_requests() {
        let store = Arc::new(MemoryStore::new());
        let handle = spawn_game(store);
        let board = handle.board(None).await.unwrap();
        assert_eq!(board.territories.len(), 36);
        let view = handle.territory(TerritoryId(36)).await.unwrap();
        assert_eq!(view.name, "Seas 6");
        assert_eq!(handle.name(), "actor");
        assert!(!handle.is_closed());
    }
}
