//! Game actions a team can take during its turn.
//!
//! This module defines the action payloads accepted by the rules engine and
//! the errors it reports when an action is illegal.

use crate::hex::{AxialCoord, OffsetCoord};
use crate::player::{PlayerId, TeamId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of actions a team may take before control passes to the opponent
pub const ACTIONS_PER_TURN: u32 = 2;

/// All possible game actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum GameAction {
    /// Move a player along a contiguous path of cells
    Run {
        team_id: TeamId,
        player_id: PlayerId,
        /// Cells visited after leaving the current position, in order
        path: Vec<OffsetCoord>,
        /// Try to take the ball if it lies on the path
        #[serde(default)]
        pick_up_ball: bool,
    },
    /// Kick the ball in a straight line
    Pass {
        team_id: TeamId,
        player_id: PlayerId,
        direction: AxialCoord,
        distance: u32,
    },
    /// Spend an action without touching the board
    Discard { team_id: TeamId },
}

impl GameAction {
    /// Team submitting the action
    pub fn team_id(&self) -> &str {
        match self {
            GameAction::Run { team_id, .. }
            | GameAction::Pass { team_id, .. }
            | GameAction::Discard { team_id } => team_id,
        }
    }

    /// Acting player, if the action has one
    pub fn player_id(&self) -> Option<&str> {
        match self {
            GameAction::Run { player_id, .. } | GameAction::Pass { player_id, .. } => {
                Some(player_id)
            }
            GameAction::Discard { .. } => None,
        }
    }

    /// Wire tag of the action
    pub fn kind(&self) -> &'static str {
        match self {
            GameAction::Run { .. } => "run",
            GameAction::Pass { .. } => "pass",
            GameAction::Discard { .. } => "discard",
        }
    }
}

/// Why the rules engine refused an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionError {
    #[error("Team is not part of this game")]
    UnknownTeam,

    #[error("It is not this team's turn")]
    NotActiveTeam,

    #[error("Player does not exist")]
    UnknownPlayer,

    #[error("Player does not belong to the acting team")]
    PlayerNotOnTeam,

    #[error("Run path is empty")]
    PathEmpty,

    #[error("Run path is longer than the player's speed")]
    PathTooLong,

    #[error("Run path leaves the pitch")]
    PathOutOfBounds,

    #[error("Run path is not a contiguous walk")]
    PathNotContiguous,

    #[error("Run path crosses an occupied cell")]
    PathBlocked,

    #[error("Ball is not on the run path")]
    BallPickupNotOnPath,

    #[error("Ball is held by another player")]
    BallPickupUnavailable,

    #[error("Player must be on the ball to pass")]
    PassRequiresBall,

    #[error("Pass direction is not a hex direction")]
    PassInvalidDirection,

    #[error("Pass distance is out of range")]
    PassInvalidDistance,

    #[error("Pass is blocked or leaves the pitch")]
    PassBlocked,
}

impl ActionError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::UnknownTeam => "unknown_team",
            ActionError::NotActiveTeam => "not_active_team",
            ActionError::UnknownPlayer => "unknown_player",
            ActionError::PlayerNotOnTeam => "player_not_on_team",
            ActionError::PathEmpty => "path_empty",
            ActionError::PathTooLong => "path_too_long",
            ActionError::PathOutOfBounds => "path_out_of_bounds",
            ActionError::PathNotContiguous => "path_not_contiguous",
            ActionError::PathBlocked => "path_blocked",
            ActionError::BallPickupNotOnPath => "ball_pickup_not_on_path",
            ActionError::BallPickupUnavailable => "ball_pickup_unavailable",
            ActionError::PassRequiresBall => "pass_requires_ball",
            ActionError::PassInvalidDirection => "pass_invalid_direction",
            ActionError::PassInvalidDistance => "pass_invalid_distance",
            ActionError::PassBlocked => "pass_blocked",
        }
    }
}
