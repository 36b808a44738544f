//! Rule resolution.
//!
//! Applies the game rules to a board: dealing starting positions,
//! recomputing supply lines, rotating turns and moving troops.

pub mod allocate;
pub mod movement;
pub mod supply;
pub mod turn;

pub use allocate::{
    allocate_starting_positions, starting_locations, AllocationSummary, StartingLocation,
    BUNDLES_PER_PLAYER, DEPOT_TROOPS, SURROUNDING_TROOPS,
};
pub use movement::{move_troops, validate_move, MoveRequest};
pub use supply::{mark_supplied, mark_unsupplied, recompute_supply};
pub use turn::{active_player, consume_action, ensure_active, ACTIONS_PER_TURN};
