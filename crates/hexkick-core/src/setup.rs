//! Client-side checks for the pre-kickoff setup screens.
//!
//! The server re-validates everything on `placePlayers` / `placeBall`; these
//! helpers let a UI grey out cells before a request is ever sent.

use crate::board::{TeamSide, BOARD, PLAYERS_PER_TEAM};
use crate::hex::OffsetCoord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Setup screens, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupPhase {
    Side,
    Players,
    Ball,
    Ready,
}

/// What the local team has chosen so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupContext {
    pub phase: SetupPhase,
    pub selected_side: Option<TeamSide>,
    pub player_positions: Vec<OffsetCoord>,
    pub opponent_positions: Vec<OffsetCoord>,
}

impl SetupContext {
    fn occupied(&self) -> HashSet<OffsetCoord> {
        self.player_positions
            .iter()
            .chain(self.opponent_positions.iter())
            .copied()
            .collect()
    }

    /// Whether clicking `coord` during player placement would be accepted.
    ///
    /// A cell already holding one of our players is always valid (it toggles
    /// off); otherwise the cell must be on our row, free, and we must still
    /// have players to place.
    pub fn is_valid_player_placement(&self, coord: OffsetCoord) -> bool {
        if self.phase != SetupPhase::Players {
            return false;
        }
        let Some(side) = self.selected_side else {
            return false;
        };
        if coord.row != side.start_row() || !BOARD.is_in_bounds(coord) {
            return false;
        }

        let ours = self.player_positions.contains(&coord);
        if self.player_positions.len() >= PLAYERS_PER_TEAM && !ours {
            return false;
        }
        ours || !self.occupied().contains(&coord)
    }

    pub fn is_valid_ball_placement(&self, coord: OffsetCoord) -> bool {
        self.phase == SetupPhase::Ball
            && BOARD.is_midline_hex(coord)
            && !self.occupied().contains(&coord)
    }
}

/// Add `coord` to the selection, or remove it if already selected.
///
/// Selections at `limit` are returned unchanged when adding.
pub fn toggle_player_position(
    positions: &[OffsetCoord],
    coord: OffsetCoord,
    limit: usize,
) -> Vec<OffsetCoord> {
    if positions.contains(&coord) {
        return positions.iter().copied().filter(|p| *p != coord).collect();
    }
    let mut next = positions.to_vec();
    if next.len() < limit {
        next.push(coord);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(phase: SetupPhase, ours: &[(i32, i32)], theirs: &[(i32, i32)]) -> SetupContext {
        SetupContext {
            phase,
            selected_side: Some(TeamSide::Top),
            player_positions: ours.iter().map(|&(c, r)| OffsetCoord::new(c, r)).collect(),
            opponent_positions: theirs.iter().map(|&(c, r)| OffsetCoord::new(c, r)).collect(),
        }
    }

    #[test]
    fn test_player_placement_requires_side_row() {
        let ctx = context(SetupPhase::Players, &[], &[]);
        assert!(ctx.is_valid_player_placement(OffsetCoord::new(3, 4)));
        assert!(!ctx.is_valid_player_placement(OffsetCoord::new(3, 5)));
        assert!(!ctx.is_valid_player_placement(OffsetCoord::new(13, 4)));
    }

    #[test]
    fn test_player_placement_wrong_phase_or_no_side() {
        let ctx = context(SetupPhase::Ball, &[], &[]);
        assert!(!ctx.is_valid_player_placement(OffsetCoord::new(3, 4)));

        let mut ctx = context(SetupPhase::Players, &[], &[]);
        ctx.selected_side = None;
        assert!(!ctx.is_valid_player_placement(OffsetCoord::new(3, 4)));
    }

    #[test]
    fn test_full_selection_only_allows_toggling_off() {
        let ctx = context(SetupPhase::Players, &[(1, 4), (2, 4), (3, 4), (4, 4)], &[]);
        assert!(ctx.is_valid_player_placement(OffsetCoord::new(2, 4)));
        assert!(!ctx.is_valid_player_placement(OffsetCoord::new(5, 4)));
    }

    #[test]
    fn test_opponent_cells_blocked() {
        let ctx = context(SetupPhase::Players, &[], &[(6, 4)]);
        assert!(!ctx.is_valid_player_placement(OffsetCoord::new(6, 4)));
    }

    #[test]
    fn test_ball_placement() {
        let ctx = context(SetupPhase::Ball, &[], &[(6, 7)]);
        assert!(ctx.is_valid_ball_placement(OffsetCoord::new(5, 7)));
        assert!(!ctx.is_valid_ball_placement(OffsetCoord::new(6, 7)));
        assert!(!ctx.is_valid_ball_placement(OffsetCoord::new(5, 6)));
    }

    #[test]
    fn test_toggle() {
        let a = OffsetCoord::new(1, 4);
        let b = OffsetCoord::new(2, 4);

        let one = toggle_player_position(&[], a, 2);
        assert_eq!(one, vec![a]);
        let two = toggle_player_position(&one, b, 2);
        assert_eq!(two, vec![a, b]);
        assert_eq!(toggle_player_position(&two, OffsetCoord::new(3, 4), 2), two);
        assert_eq!(toggle_player_position(&two, a, 2), vec![b]);
    }
}
