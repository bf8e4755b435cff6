//! Turn pacing.
//!
//! A team gets [`ACTIONS_PER_TURN`] actions, then control passes to the other
//! team and the round counter advances. Board legality is not checked here;
//! callers pair this with [`GameState::apply_action`](crate::game::GameState::apply_action)
//! and commit only when both accept.

use crate::actions::{GameAction, ACTIONS_PER_TURN};
use crate::player::TeamId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the turn coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnError {
    #[error("Team is not part of this game")]
    UnknownTeam,

    #[error("It is not this team's turn")]
    NotActiveTeam,

    #[error("No actions remaining this turn")]
    NoActionsRemaining,
}

impl TurnError {
    pub fn code(&self) -> &'static str {
        match self {
            TurnError::UnknownTeam => "unknown_team",
            TurnError::NotActiveTeam => "not_active_team",
            TurnError::NoActionsRemaining => "no_actions_remaining",
        }
    }
}

/// Whose turn it is and how much of it is left
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnState {
    pub team_ids: [TeamId; 2],
    pub active_team_id: TeamId,
    /// Starts at 1, advances on every hand-over
    pub round: u32,
    pub actions_remaining: u32,
    /// Every accepted action of the game, oldest first
    pub action_queue: Vec<GameAction>,
}

/// Result of queueing an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTurn {
    pub state: TurnState,
    /// Whether this action ended the turn and handed over to the other team
    pub switched: bool,
}

impl TurnState {
    /// Start pacing for two teams.
    ///
    /// `starting_team` is used only if it is one of `team_ids`; otherwise the
    /// first team starts.
    pub fn new(team_ids: [TeamId; 2], starting_team: Option<&str>, starting_round: u32) -> Self {
        let active_team_id = starting_team
            .filter(|id| team_ids.iter().any(|t| t == *id))
            .map(str::to_string)
            .unwrap_or_else(|| team_ids[0].clone());

        Self {
            team_ids,
            active_team_id,
            round: starting_round,
            actions_remaining: ACTIONS_PER_TURN,
            action_queue: Vec::new(),
        }
    }

    fn has_team(&self, id: &str) -> bool {
        self.team_ids.iter().any(|t| t == id)
    }

    /// The team that isn't currently active
    pub fn next_team_id(&self) -> &TeamId {
        if self.active_team_id == self.team_ids[0] {
            &self.team_ids[1]
        } else {
            &self.team_ids[0]
        }
    }

    /// Record `action` against the current turn.
    pub fn queue_action(&self, action: &GameAction) -> Result<QueuedTurn, TurnError> {
        let team_id = action.team_id();
        if !self.has_team(team_id) {
            return Err(TurnError::UnknownTeam);
        }
        if team_id != self.active_team_id {
            return Err(TurnError::NotActiveTeam);
        }
        if self.actions_remaining == 0 {
            return Err(TurnError::NoActionsRemaining);
        }

        let mut state = self.clone();
        state.action_queue.push(action.clone());
        state.actions_remaining -= 1;

        if state.actions_remaining > 0 {
            return Ok(QueuedTurn {
                state,
                switched: false,
            });
        }

        state.active_team_id = self.next_team_id().clone();
        state.round += 1;
        state.actions_remaining = ACTIONS_PER_TURN;

        Ok(QueuedTurn {
            state,
            switched: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn teams() -> [TeamId; 2] {
        ["team-a".to_string(), "team-b".to_string()]
    }

    fn discard(team: &str) -> GameAction {
        GameAction::Discard {
            team_id: team.to_string(),
        }
    }

    #[test]
    fn test_fresh_turn_state() {
        let state = TurnState::new(teams(), None, 1);

        assert_eq!(state.active_team_id, "team-a");
        assert_eq!(state.round, 1);
        assert_eq!(state.actions_remaining, ACTIONS_PER_TURN);
        assert!(state.action_queue.is_empty());
    }

    #[test]
    fn test_unknown_starting_team_falls_back_to_first() {
        let state = TurnState::new(teams(), Some("team-z"), 3);
        assert_eq!(state.active_team_id, "team-a");
        assert_eq!(state.round, 3);
    }

    #[test]
    fn test_switches_after_two_actions() {
        let state = TurnState::new(teams(), Some("team-b"), 1);

        let first = state.queue_action(&discard("team-b")).unwrap();
        assert_eq!(first.state.actions_remaining, ACTIONS_PER_TURN - 1);
        assert_eq!(first.state.action_queue.len(), 1);
        assert!(!first.switched);

        let second = first.state.queue_action(&discard("team-b")).unwrap();
        assert_eq!(second.state.active_team_id, "team-a");
        assert_eq!(second.state.round, 2);
        assert_eq!(second.state.actions_remaining, ACTIONS_PER_TURN);
        assert_eq!(second.state.action_queue.len(), 2);
        assert!(second.switched);
    }

    #[test]
    fn test_queue_is_never_trimmed() {
        let mut state = TurnState::new(teams(), None, 1);
        for i in 0..6 {
            let team = state.active_team_id.clone();
            state = state.queue_action(&discard(&team)).unwrap().state;
            assert_eq!(state.action_queue.len(), i + 1);
        }
        assert_eq!(state.round, 4);
    }

    #[test]
    fn test_rejects_inactive_team() {
        let state = TurnState::new(teams(), None, 1);
        assert_eq!(
            state.queue_action(&discard("team-b")),
            Err(TurnError::NotActiveTeam)
        );
        assert!(state.action_queue.is_empty());
    }

    #[test]
    fn test_rejects_unknown_team() {
        let state = TurnState::new(teams(), None, 1);
        assert_eq!(
            state.queue_action(&discard("team-c")),
            Err(TurnError::UnknownTeam)
        );
    }

    #[test]
    fn test_rejects_exhausted_turn() {
        let mut state = TurnState::new(teams(), None, 1);
        state.actions_remaining = 0;
        assert_eq!(
            state.queue_action(&discard("team-a")),
            Err(TurnError::NoActionsRemaining)
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(TurnError::UnknownTeam.code(), "unknown_team");
        assert_eq!(TurnError::NotActiveTeam.code(), "not_active_team");
        assert_eq!(TurnError::NoActionsRemaining.code(), "no_actions_remaining");
    }
}
