//! Per-cell view of the pitch for rendering.

use crate::game::GameState;
use crate::hex::OffsetCoord;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What occupies a single cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum FieldState {
    Free { coord: OffsetCoord },
    Player { coord: OffsetCoord, player_id: PlayerId },
    Ball { coord: OffsetCoord },
    PlayerWithBall { coord: OffsetCoord, player_id: PlayerId },
}

/// Lookup of occupied cells; cells not present are free
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    cells: HashMap<OffsetCoord, FieldState>,
}

impl FieldIndex {
    /// Index every player and, if asked, the ball
    pub fn build(state: &GameState, include_ball: bool) -> Self {
        let mut cells = HashMap::new();

        for player in state.teams.iter().flat_map(|team| team.players.iter()) {
            cells.insert(
                player.position,
                FieldState::Player {
                    coord: player.position,
                    player_id: player.id.clone(),
                },
            );
        }

        if include_ball {
            let coord = state.ball.position;
            let cell = match cells.remove(&coord) {
                Some(FieldState::Player { player_id, .. }) => {
                    FieldState::PlayerWithBall { coord, player_id }
                }
                _ => FieldState::Ball { coord },
            };
            cells.insert(coord, cell);
        }

        Self { cells }
    }

    /// State of `coord`
    pub fn at(&self, coord: OffsetCoord) -> FieldState {
        self.cells
            .get(&coord)
            .cloned()
            .unwrap_or(FieldState::Free { coord })
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
