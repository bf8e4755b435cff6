//! Game state and the rules engine.
//!
//! `GameState::apply_action` validates one action against the pitch geometry
//! and the current occupancy. It never mutates the state it is called on:
//! legal actions yield a fresh state, illegal ones an [`ActionError`] and the
//! caller keeps its state as it was.

use crate::actions::{ActionError, GameAction};
use crate::board::BOARD;
use crate::hex::{AxialCoord, OffsetCoord};
use crate::player::{Player, PlayerId, Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The ball and who, if anyone, is carrying it.
///
/// When `carrier_player_id` is set, that player's position equals `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ball {
    pub position: OffsetCoord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_player_id: Option<PlayerId>,
}

impl Ball {
    /// A loose ball at `position`
    pub fn loose(position: OffsetCoord) -> Self {
        Self {
            position,
            carrier_player_id: None,
        }
    }
}

/// The complete board state of one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// One team until the opponent joins, then two
    pub teams: Vec<Team>,
    pub ball: Ball,
    pub active_team_id: TeamId,
    pub round: u32,
}

impl GameState {
    /// A fresh game with a single team and the ball on the centre spot
    pub fn new(team: Team) -> Self {
        let active_team_id = team.id.clone();
        Self {
            teams: vec![team],
            ball: Ball::loose(BOARD.center_spot()),
            active_team_id,
            round: 1,
        }
    }

    pub fn get_team(&self, id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// The first team that isn't `id`
    pub fn other_team(&self, id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id != id)
    }

    /// Look up a player on any team, along with the team that owns them
    pub fn find_player(&self, id: &str) -> Option<(&Team, &Player)> {
        self.teams
            .iter()
            .find_map(|team| team.get_player(id).map(|player| (team, player)))
    }

    /// Positions of every player, optionally ignoring one of them
    pub fn occupied_positions(&self, ignore: Option<&str>) -> HashSet<OffsetCoord> {
        self.teams
            .iter()
            .flat_map(|team| team.players.iter())
            .filter(|player| Some(player.id.as_str()) != ignore)
            .map(|player| player.position)
            .collect()
    }

    /// Whether some player stands on `coord`
    pub fn is_occupied(&self, coord: OffsetCoord) -> bool {
        self.teams
            .iter()
            .flat_map(|team| team.players.iter())
            .any(|player| player.position == coord)
    }

    /// Validate `action` and return the resulting state.
    pub fn apply_action(&self, action: &GameAction) -> Result<GameState, ActionError> {
        let team_id = action.team_id();
        if self.get_team(team_id).is_none() {
            return Err(ActionError::UnknownTeam);
        }
        if team_id != self.active_team_id {
            return Err(ActionError::NotActiveTeam);
        }

        match action {
            GameAction::Discard { .. } => Ok(self.clone()),
            GameAction::Run {
                player_id,
                path,
                pick_up_ball,
                ..
            } => {
                let player = self.acting_player(team_id, player_id)?;
                self.validate_run(player, path, *pick_up_ball)?;
                Ok(self.resolve_run(player_id, path, *pick_up_ball))
            }
            GameAction::Pass {
                player_id,
                direction,
                distance,
                ..
            } => {
                let player = self.acting_player(team_id, player_id)?;
                let destination = self.validate_pass(player, *direction, *distance)?;
                let mut next = self.clone();
                next.ball = Ball::loose(destination);
                Ok(next)
            }
        }
    }

    fn acting_player(&self, team_id: &str, player_id: &str) -> Result<&Player, ActionError> {
        let (team, player) = self
            .find_player(player_id)
            .ok_or(ActionError::UnknownPlayer)?;
        if team.id != team_id {
            return Err(ActionError::PlayerNotOnTeam);
        }
        Ok(player)
    }

    fn validate_run(
        &self,
        player: &Player,
        path: &[OffsetCoord],
        pick_up_ball: bool,
    ) -> Result<(), ActionError> {
        if path.is_empty() {
            return Err(ActionError::PathEmpty);
        }
        if path.len() > player.skills.speed as usize {
            return Err(ActionError::PathTooLong);
        }
        if path.iter().any(|coord| !BOARD.is_in_bounds(*coord)) {
            return Err(ActionError::PathOutOfBounds);
        }

        let mut previous = player.position;
        for coord in path {
            if !previous.is_adjacent(coord) {
                return Err(ActionError::PathNotContiguous);
            }
            previous = *coord;
        }

        let occupied = self.occupied_positions(Some(player.id.as_str()));
        if path.iter().any(|coord| occupied.contains(coord)) {
            return Err(ActionError::PathBlocked);
        }

        if pick_up_ball {
            // The starting cell counts: a player standing on the ball may take it along.
            let on_path =
                self.ball.position == player.position || path.contains(&self.ball.position);
            if !on_path {
                return Err(ActionError::BallPickupNotOnPath);
            }
            if let Some(carrier) = &self.ball.carrier_player_id {
                if *carrier != player.id {
                    return Err(ActionError::BallPickupUnavailable);
                }
            }
        }

        Ok(())
    }

    fn resolve_run(&self, player_id: &str, path: &[OffsetCoord], pick_up_ball: bool) -> GameState {
        let mut next = self.clone();
        let Some(destination) = path.last().copied() else {
            return next;
        };

        if let Some(player) = next
            .teams
            .iter_mut()
            .find_map(|team| team.get_player_mut(player_id))
        {
            player.position = destination;
        }

        let already_carrying = next.ball.carrier_player_id.as_deref() == Some(player_id);
        if already_carrying || pick_up_ball {
            next.ball = Ball {
                position: destination,
                carrier_player_id: Some(player_id.to_string()),
            };
        }

        next
    }

    /// Check a pass and return the cell the ball lands on
    fn validate_pass(
        &self,
        player: &Player,
        direction: AxialCoord,
        distance: u32,
    ) -> Result<OffsetCoord, ActionError> {
        // Standing on the ball is what matters, not the recorded carrier.
        if player.position != self.ball.position {
            return Err(ActionError::PassRequiresBall);
        }
        if !direction.is_unit_direction() {
            return Err(ActionError::PassInvalidDirection);
        }
        if distance < 1 || distance > player.skills.passing {
            return Err(ActionError::PassInvalidDistance);
        }

        let occupied = self.occupied_positions(None);
        let mut landing = player.position;
        for step in 1..=distance {
            let step = i32::try_from(step).map_err(|_| ActionError::PassBlocked)?;
            landing = player.position.step(direction, step);
            if !BOARD.is_in_bounds(landing) || occupied.contains(&landing) {
                return Err(ActionError::PassBlocked);
            }
        }

        Ok(landing)
    }
}
