//! Concurrent game hosting.
//!
//! Each game lives in its own task (`actor`), and the `registry` routes
//! requests to the right task by game name.

pub mod actor;
pub mod registry;

pub use actor::{GameHandle, Request};
pub use registry::{GameRegistry, RegistrySettings};
