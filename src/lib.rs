//! Supplyline rules engine library.
//!
//! Exposes the map and game state, the rule modules (allocation, supply,
//! turns, movement), the per-game server and the line protocol for use by
//! integration tests and the binary entry points.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod resolve;
pub mod selfplay;
pub mod server;
pub mod store;
