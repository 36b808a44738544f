//! Supply-line connectivity.
//!
//! A territory is supplied when an unbroken chain of territories owned by
//! the same player connects it to one of that player's supply depots.
//! Recomputation clears every flag, then flood-fills outward from the
//! depots. Unowned and enemy territories stop the fill.

use std::collections::VecDeque;

use tracing::debug;

use crate::board::{Ledger, MapGraph, TerritoryId};

/// Clears the supplied flag on every territory.
pub fn mark_unsupplied(ledger: &mut Ledger) {
    for t in ledger.iter_mut() {
        t.supplied = false;
    }
}

/// Marks every territory reachable from `depots` through same-owner chains.
///
/// Each depot is marked supplied. A depot without an owner is marked but
/// never expands, since no neighbor can share its (absent) owner. Unknown
/// depot ids are skipped. Nodes already supplied are never expanded twice,
/// so the fill terminates on cyclic maps.
pub fn mark_supplied(map: &MapGraph, ledger: &mut Ledger, depots: &[TerritoryId]) {
    let mut queue: VecDeque<TerritoryId> = VecDeque::with_capacity(ledger.len());

    for &depot in depots {
        if let Some(t) = ledger.get_mut(depot) {
            if !t.supplied {
                t.supplied = true;
                queue.push_back(depot);
            }
        }
    }

    while let Some(current) = queue.pop_front() {
        let Some(owner) = ledger.get(current).and_then(|t| t.owner) else {
            continue;
        };
        let Some(neighbors) = map.neighbors(current) else {
            continue;
        };
        for next in neighbors.iter() {
            if let Some(t) = ledger.get_mut(next) {
                if !t.supplied && t.owner == Some(owner) {
                    t.supplied = true;
                    queue.push_back(next);
                }
            }
        }
    }
}

/// Recomputes every supplied flag from the ledger's supply depots.
///
/// Returns the number of supplied territories.
pub fn recompute_supply(map: &MapGraph, ledger: &mut Ledger) -> usize {
    mark_unsupplied(ledger);
    let depots = ledger.depots();
    mark_supplied(map, ledger, &depots);
    let supplied = ledger.supplied_count();
    debug!(depots = depots.len(), supplied, "supply recomputed");
    supplied
}
