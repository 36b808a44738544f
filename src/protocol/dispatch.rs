//! Routes parsed commands to the game registry.

use serde::Serialize;

use crate::board::{PlayerNumber, TerritoryId};
use crate::resolve::{AllocationSummary, MoveRequest};
use crate::server::GameRegistry;

use super::parser::Command;
use super::response::Response;

#[derive(Serialize)]
struct DepotAssignment {
    player_number: PlayerNumber,
    territory_id: TerritoryId,
}

fn depots(summary: &AllocationSummary) -> Vec<DepotAssignment> {
    summary
        .depots
        .iter()
        .map(|&(player_number, territory_id)| DepotAssignment {
            player_number,
            territory_id,
        })
        .collect()
}

/// Executes one command. `Quit` is answered here but ending the loop is
/// up to the caller.
pub async fn dispatch(registry: &GameRegistry, command: Command) -> Response {
    match command {
        Command::Create { game } => registry.create(&game).await.into(),
        Command::Delete { game } => match registry.delete(&game).await {
            Ok(()) => Response::ok().field("game", game),
            Err(e) => Response::from(&e),
        },
        Command::Join { game, name } => match registry.join(&game, &name).await {
            Ok(number) => Response::ok().field("player_number", number),
            Err(e) => Response::from(&e),
        },
        Command::Start { game } => match registry.start(&game).await {
            Ok(summary) => Response::ok().field("depots", depots(&summary)),
            Err(e) => Response::from(&e),
        },
        Command::Status { game } => registry.status(&game).await.into(),
        Command::Skip { game, player } => match registry.skip(&game, player).await {
            Ok(remaining) => Response::ok().field("actions_remaining", remaining),
            Err(e) => Response::from(&e),
        },
        Command::Move {
            game,
            player,
            from,
            to,
            troops,
        } => {
            let request = MoveRequest {
                player,
                from,
                to,
                troops,
            };
            registry.move_troops(&game, request).await.into()
        }
        Command::Board { game, player } => registry.board(&game, player).await.into(),
        Command::Territory { game, id } => registry.territory(&game, id).await.into(),
        Command::Map => Response::ok()
            .field("name", registry.map().name())
            .field("territories", registry.map_territories()),
        Command::Quit => Response::ok(),
    }
}
