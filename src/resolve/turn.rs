//! Turn rotation and action budgets.
//!
//! The active player is derived from the turn number alone: player numbers
//! are 1-based and the rotation wraps on multiples of the player count.
//! Each player spends up to three actions per turn; spending the last one
//! passes the turn.

use crate::board::{Game, PlayerNumber};
use crate::error::{Forbidden, GameError};

/// Actions a player may spend per turn.
pub const ACTIONS_PER_TURN: u8 = 3;

/// Returns the player number allowed to act on `turn_number`.
///
/// `player_count` must be at least 1.
pub fn active_player(turn_number: u32, player_count: usize) -> PlayerNumber {
    debug_assert!(player_count >= 1);
    let count = player_count.max(1) as u64;
    let rem = u64::from(turn_number) % count;
    let seat = if rem == 0 { count } else { rem };
    // Player counts are bounded by MAX_PLAYERS, well inside u8.
    PlayerNumber(seat as u8)
}

/// Checks that `requesting` is the active player without mutating anything.
pub fn ensure_active(game: &Game, requesting: PlayerNumber) -> Result<(), GameError> {
    let active = game
        .active_player()
        .ok_or_else(|| GameError::NotFound(format!("players in game '{}'", game.name)))?;
    if active != requesting {
        return Err(Forbidden::NotYourTurn { active, requested: requesting }.into());
    }
    Ok(())
}

/// Spends one action of the active player.
///
/// Returns the actions left afterwards. When the last action is spent the
/// budget resets to three, the turn number advances and 0 is returned.
pub fn consume_action(game: &mut Game, requesting: PlayerNumber) -> Result<u8, GameError> {
    ensure_active(game, requesting)?;

    let game_name = game.name.clone();
    let player = game
        .player_mut(requesting)
        .ok_or_else(|| GameError::NotFound(format!("player {} in game '{}'", requesting, game_name)))?;

    let remaining = player.remaining_actions.saturating_sub(1);
    if remaining == 0 {
        player.remaining_actions = ACTIONS_PER_TURN;
        game.turn_number += 1;
    } else {
        player.remaining_actions = remaining;
    }
    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MapGraph;
    use crate::error::GameError;

    fn game_with_players(n: usize) -> Game {
        let mut game = Game::new("turns", &MapGraph::standard());
        for i in 0..n {
            game.add_player(&format!("p{}", i + 1)).unwrap();
        }
        game.started = true;
        game
    }

    #[test]
    fn active_player_stays_in_range() {
        for count in 1..=4usize {
            for turn in 1..=50u32 {
                let active = active_player(turn, count);
                assert!(active.0 >= 1 && active.0 as usize <= count);
                let wraps = turn as usize % count == 0;
                assert_eq!(active.0 as usize == count, wraps, "turn {} count {}", turn, count);
            }
        }
    }

    #[test]
    fn active_player_rotation() {
        assert_eq!(active_player(1, 3), PlayerNumber(1));
        assert_eq!(active_player(2, 3), PlayerNumber(2));
        assert_eq!(active_player(3, 3), PlayerNumber(3));
        assert_eq!(active_player(4, 3), PlayerNumber(1));
        assert_eq!(active_player(5, 3), PlayerNumber(2));
        assert_eq!(active_player(7, 1), PlayerNumber(1));
    }

    #[test]
    fn three_actions_pass_the_turn() {
        let mut game = game_with_players(2);
        assert_eq!(consume_action(&mut game, PlayerNumber(1)), Ok(2));
        assert_eq!(consume_action(&mut game, PlayerNumber(1)), Ok(1));
        assert_eq!(game.turn_number, 1);
        assert_eq!(consume_action(&mut game, PlayerNumber(1)), Ok(0));
        assert_eq!(game.turn_number, 2);
        assert_eq!(game.player(PlayerNumber(1)).unwrap().remaining_actions, 3);
        assert_eq!(game.active_player(), Some(PlayerNumber(2)));
    }

    #[test]
    fn inactive_player_is_forbidden_and_state_unchanged() {
        let mut game = game_with_players(3);
        let before = game.clone();
        let err = consume_action(&mut game, PlayerNumber(2)).unwrap_err();
        assert_eq!(
            err,
            GameError::Forbidden(Forbidden::NotYourTurn {
                active: PlayerNumber(1),
                requested: PlayerNumber(2),
            })
        );
        assert_eq!(game, before);
    }

    #[test]
    fn last_action_of_turn_five_advances_to_six() {
        let mut game = game_with_players(3);
        game.turn_number = 5;
        game.player_mut(PlayerNumber(2)).unwrap().remaining_actions = 1;

        assert_eq!(consume_action(&mut game, PlayerNumber(2)), Ok(0));
        assert_eq!(game.turn_number, 6);
        assert_eq!(game.player(PlayerNumber(2)).unwrap().remaining_actions, 3);
    }

    #[test]
    fn game_without_players_is_not_found() {
        let mut game = Game::new("empty", &MapGraph::standard());
        let err = consume_action(&mut game, PlayerNumber(1)).unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert_eq!(game.turn_number, 1);
    }
}
