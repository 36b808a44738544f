//! Self-play simulation.
//!
//! Plays games between random players directly against the engine, checking
//! the rule invariants after every action: troops are conserved, the active
//! player stays in range, action budgets stay within bounds, and every
//! supply depot remains supplied. Records are written as JSONL.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::board::{Game, MapGraph, PlayerNumber, TerritoryId};
use crate::engine::Engine;
use crate::error::GameError;
use crate::resolve::{MoveRequest, ACTIONS_PER_TURN};

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Players seated in each game (2 to 4 on the standard map).
    pub players: usize,
    /// Turn number at which a game is stopped.
    pub max_turns: u32,
    /// Chance that a player skips even when a move is available.
    pub skip_probability: f64,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            players: 4,
            max_turns: 60,
            skip_probability: 0.1,
            threads: 4,
            seed: 0,
        }
    }
}

/// One action taken during a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRecord {
    Skip {
        turn: u32,
        player: PlayerNumber,
    },
    Move {
        turn: u32,
        player: PlayerNumber,
        from: TerritoryId,
        to: TerritoryId,
        troops: u32,
    },
}

/// A complete self-play game record.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    /// Sequential game ID.
    pub game_id: usize,
    pub players: usize,
    pub actions: Vec<ActionRecord>,
    pub final_turn: u32,
    /// Troops held by each player at the end, in seat order.
    pub final_troops: Vec<u32>,
    /// Territories supplied at the end.
    pub supplied: usize,
    /// Invariant failures, empty for a healthy game.
    pub violations: Vec<String>,
}

/// Plays a single self-play game and returns the game record.
pub fn play_game(
    map: &Arc<MapGraph>,
    config: &SelfPlayConfig,
    game_id: usize,
    rng: &mut SmallRng,
) -> Result<GameRecord, GameError> {
    let mut engine = Engine::with_seed(Arc::clone(map), rng.gen());
    let mut game = engine.create_game(&format!("selfplay-{}", game_id));
    for seat in 1..=config.players {
        engine.join(&mut game, &format!("bot{}", seat))?;
    }
    engine.start(&mut game)?;

    // Nothing is ever captured, so the dealt total must hold all game long.
    let troops = game.ledger.total_troops();
    let mut actions = Vec::new();
    let mut violations = check_invariants(&game, troops);

    while game.turn_number <= config.max_turns && violations.is_empty() {
        let Some(player) = game.active_player() else {
            break;
        };
        let turn = game.turn_number;
        let moves = legal_moves(map, &game, player);

        if moves.is_empty() || rng.gen_bool(config.skip_probability.clamp(0.0, 1.0)) {
            engine.skip(&mut game, player)?;
            actions.push(ActionRecord::Skip { turn, player });
        } else {
            let (from, to, available) = moves[rng.gen_range(0..moves.len())];
            let request = MoveRequest {
                player,
                from,
                to,
                troops: rng.gen_range(1..available),
            };
            engine.move_troops(&mut game, &request)?;
            actions.push(ActionRecord::Move {
                turn,
                player,
                from,
                to,
                troops: request.troops,
            });
        }

        violations = check_invariants(&game, troops);
    }

    Ok(GameRecord {
        game_id,
        players: config.players,
        actions,
        final_turn: game.turn_number,
        final_troops: game
            .player_numbers()
            .into_iter()
            .map(|p| game.ledger.troops_of(p))
            .collect(),
        supplied: game.ledger.supplied_count(),
        violations,
    })
}

/// Moves available to `player`: owned neighbor pairs where the source can
/// spare at least one troop. Returns `(from, to, troops on from)`.
fn legal_moves(
    map: &MapGraph,
    game: &Game,
    player: PlayerNumber,
) -> Vec<(TerritoryId, TerritoryId, u32)> {
    let mut moves = Vec::new();
    for from in game.ledger.owned_by(player).filter(|t| t.troops > 1) {
        let Some(neighbors) = map.neighbors(from.territory_id) else {
            continue;
        };
        for to in neighbors.iter() {
            if game.ledger.get(to).is_some_and(|t| t.is_owned_by(player)) {
                moves.push((from.territory_id, to, from.troops));
            }
        }
    }
    moves
}

/// Returns a description of every broken invariant.
pub fn check_invariants(game: &Game, expected_troops: u32) -> Vec<String> {
    let mut violations = Vec::new();
    let count = game.player_count();

    let total = game.ledger.total_troops();
    if total != expected_troops {
        violations.push(format!("troop total {} != {}", total, expected_troops));
    }

    match game.active_player() {
        Some(p) if p.0 >= 1 && usize::from(p.0) <= count => {}
        other => violations.push(format!("active player {:?} outside 1..={}", other, count)),
    }

    for p in &game.players {
        if p.remaining_actions == 0 || p.remaining_actions > ACTIONS_PER_TURN {
            violations.push(format!("player {} has {} actions", p.number, p.remaining_actions));
        }
    }

    for depot in game.ledger.iter().filter(|t| t.supply_depot) {
        if !depot.supplied {
            violations.push(format!("depot {} is not supplied", depot.territory_id));
        }
    }

    violations
}

/// Runs self-play generation, producing multiple game records ordered by id.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(map: &Arc<MapGraph>, config: &SelfPlayConfig) -> Vec<GameRecord> {
    use rayon::prelude::*;

    let play = |i: usize| {
        let mut rng = if config.seed != 0 {
            SmallRng::seed_from_u64(config.seed.wrapping_add(i as u64))
        } else {
            SmallRng::from_entropy()
        };
        let started = Instant::now();
        match play_game(map, config, i, &mut rng) {
            Ok(game) => {
                info!(
                    game = i,
                    turns = game.final_turn,
                    actions = game.actions.len(),
                    violations = game.violations.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "game finished"
                );
                Some(game)
            }
            Err(e) => {
                warn!(game = i, error = %e, "game aborted");
                None
            }
        }
    };

    if config.threads <= 1 {
        return (0..config.num_games).filter_map(play).collect();
    }

    match rayon::ThreadPoolBuilder::new().num_threads(config.threads).build() {
        Ok(pool) => pool.install(|| (0..config.num_games).into_par_iter().filter_map(play).collect()),
        Err(e) => {
            warn!(error = %e, "falling back to the global rayon pool");
            (0..config.num_games).into_par_iter().filter_map(play).collect()
        }
    }
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let total = games.len();
    let actions: usize = games.iter().map(|g| g.actions.len()).sum();
    let moves: usize = games
        .iter()
        .flat_map(|g| &g.actions)
        .filter(|a| matches!(a, ActionRecord::Move { .. }))
        .count();
    let broken = games.iter().filter(|g| !g.violations.is_empty()).count();

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", total);
    eprintln!("Avg actions/game: {:.1}", actions as f64 / total.max(1) as f64);
    eprintln!("Moves: {} ({:.1}%)", moves, 100.0 * moves as f64 / actions.max(1) as f64);
    eprintln!("Games with invariant violations: {}", broken);
    for game in games.iter().filter(|g| !g.violations.is_empty()) {
        eprintln!("  game {}: {}", game.game_id, game.violations.join("; "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Arc<MapGraph> {
        Arc::new(MapGraph::standard())
    }

    #[test]
    fn play_single_game_keeps_invariants() {
        let config = SelfPlayConfig {
            players: 3,
            max_turns: 30,
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(42);
        let game = play_game(&standard(), &config, 0, &mut rng).unwrap();

        assert!(game.violations.is_empty(), "{:?}", game.violations);
        assert_eq!(game.final_turn, 31);
        assert!(game.final_troops.iter().all(|&t| t == 40));
        assert_eq!(game.actions.len(), 30 * ACTIONS_PER_TURN as usize);
        assert_eq!(game.final_troops.iter().sum::<u32>(), 120);
    }

    #[test]
    fn every_player_count_plays_cleanly() {
        for players in 2..=4 {
            let config = SelfPlayConfig {
                players,
                max_turns: 20,
                skip_probability: 0.0,
                ..Default::default()
            };
            let mut rng = SmallRng::seed_from_u64(players as u64);
            let game = play_game(&standard(), &config, 0, &mut rng).unwrap();
            assert!(game.violations.is_empty(), "{:?}", game.violations);
        }
    }

    #[test]
    fn too_many_players_is_rejected() {
        let config = SelfPlayConfig {
            players: 5,
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let err = play_game(&standard(), &config, 0, &mut rng).unwrap_err();
        assert_eq!(err.kind(), "conflict");
    }

    #[test]
    fn sequential_and_parallel_runs_agree() {
        let base = SelfPlayConfig {
            num_games: 4,
            max_turns: 10,
            seed: 77,
            ..Default::default()
        };
        let sequential = run_self_play(&standard(), &SelfPlayConfig { threads: 1, ..base.clone() });
        let parallel = run_self_play(&standard(), &SelfPlayConfig { threads: 2, ..base });
        assert_eq!(sequential.len(), 4);
        assert_eq!(parallel.len(), 4);
        for (a, b) in sequential.iter().zip(&parallel) {
            assert_eq!(a.game_id, b.game_id);
            assert_eq!(a.actions, b.actions);
        }
    }

    #[test]
    fn jsonl_output_is_valid() {
        let config = SelfPlayConfig {
            num_games: 2,
            max_turns: 5,
            threads: 1,
            seed: 3,
            ..Default::default()
        };
        let games = run_self_play(&standard(), &config);
        let mut buf = Vec::new();
        write_jsonl(&games, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let v: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(v["actions"].is_array());
            let first = &v["actions"][0];
            assert!(first["action"] == "move" || first["action"] == "skip");
        }
    }

    #[test]
    fn broken_conservation_is_reported() {
        let map = MapGraph::standard();
        let mut game = Game::new("broken", &map);
        game.add_player("a").unwrap();
        game.add_player("b").unwrap();
        let violations = check_invariants(&game, 80);
        assert!(violations.iter().any(|v| v.starts_with("troop total")));
        assert!(check_invariants(&game, 0).is_empty());
    }
}
