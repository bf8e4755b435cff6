//! Game sessions and the store that owns them.
//!
//! Every inbound operation goes through [`SessionStore`]. Each operation holds
//! the session's map entry for its whole duration, validates against the
//! current state, and only then replaces it, so a failed operation leaves
//! nothing behind. Accepted mutations are published to the session's
//! subscribers as full snapshots.

use dashmap::DashMap;
use hexkick_core::{
    pass_targets, run_targets, ActionError, Ball, GameAction, GameState, OffsetCoord, PassTarget,
    Player, RunTarget, Team, TeamId, TeamSide, TurnState, BOARD, PLAYERS_PER_TEAM,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::hub::{Hub, SubscriberId, Subscription};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Session already has two teams")]
    SessionFull,

    #[error("Team not found")]
    TeamNotFound,

    #[error("{0}")]
    PlayersInvalid(String),

    #[error("{0}")]
    BallInvalid(String),

    #[error("Turn order is not ready yet")]
    TurnNotReady,

    #[error("No actions remaining this turn")]
    NoActionsRemaining,

    #[error("{message}")]
    ActionInvalid {
        message: String,
        action_error: Option<ActionError>,
    },
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::SessionNotFound => "session_not_found",
            SessionError::SessionFull => "session_full",
            SessionError::TeamNotFound => "team_not_found",
            SessionError::PlayersInvalid(_) => "players_invalid",
            SessionError::BallInvalid(_) => "ball_invalid",
            SessionError::TurnNotReady => "turn_not_ready",
            SessionError::NoActionsRemaining => "no_actions_remaining",
            SessionError::ActionInvalid { .. } => "action_invalid",
        }
    }

    /// Wire form of the error
    pub fn payload(&self) -> ErrorPayload {
        let action_error = match self {
            SessionError::ActionInvalid {
                action_error: Some(e),
                ..
            } => Some(ActionErrorInfo {
                code: e.code().to_string(),
                message: e.to_string(),
            }),
            _ => None,
        };
        ErrorPayload {
            code: self.code().to_string(),
            message: self.to_string(),
            action_error,
        }
    }

    fn players(message: impl Into<String>) -> Self {
        SessionError::PlayersInvalid(message.into())
    }

    fn ball(message: impl Into<String>) -> Self {
        SessionError::BallInvalid(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionErrorInfo {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_error: Option<ActionErrorInfo>,
}

/// Serialized view of a session, as sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub game_state: GameState,
    /// `None` until the ball is placed
    pub turn_state: Option<TurnState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball_placed_by_team_id: Option<TeamId>,
}

/// Result of creating or joining a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedSession {
    pub session: SessionView,
    pub team_id: TeamId,
}

/// Events on a session's update stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Full snapshot after a change, or on subscription
    State(SessionView),
}

impl SessionEvent {
    pub fn label(&self) -> &'static str {
        match self {
            SessionEvent::State(_) => "state",
        }
    }
}

/// One game: its state plus the observers watching it
pub struct Session {
    pub id: Uuid,
    pub game_state: GameState,
    pub turn_state: Option<TurnState>,
    pub ball_placed_by_team_id: Option<TeamId>,
    subscribers: Hub<SessionEvent>,
}

impl Session {
    fn new(team: Team, subscriber_buffer: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_state: GameState::new(team),
            turn_state: None,
            ball_placed_by_team_id: None,
            subscribers: Hub::new(subscriber_buffer),
        }
    }

    pub fn to_view(&self) -> SessionView {
        SessionView {
            id: self.id,
            game_state: self.game_state.clone(),
            turn_state: self.turn_state.clone(),
            ball_placed_by_team_id: self.ball_placed_by_team_id.clone(),
        }
    }

    /// Push the current snapshot to every subscriber and return it
    fn publish(&mut self) -> SessionView {
        let view = self.to_view();
        if !self.subscribers.is_empty() {
            let event = SessionEvent::State(view.clone());
            let delivered = self.subscribers.publish(&event);
            debug!(session = %self.id, event = event.label(), delivered, "Broadcast");
        }
        view
    }

    fn validate_players(&self, team: &Team, players: &[Player]) -> Result<(), SessionError> {
        if players.len() != PLAYERS_PER_TEAM {
            return Err(SessionError::players(format!(
                "Exactly {} players are required",
                PLAYERS_PER_TEAM
            )));
        }

        let ids: HashSet<&str> = players.iter().map(|p| p.id.as_str()).collect();
        if ids.len() != players.len() {
            return Err(SessionError::players("Player ids must be unique"));
        }
        let taken_elsewhere = self
            .game_state
            .teams
            .iter()
            .filter(|t| t.id != team.id)
            .flat_map(|t| t.players.iter())
            .any(|p| ids.contains(p.id.as_str()));
        if taken_elsewhere {
            return Err(SessionError::players("Player ids are already used by the other team"));
        }

        let required_row = team.side.start_row();
        let occupied = self.game_state.occupied_positions(None);
        let mut incoming = HashSet::new();

        for player in players {
            if !player.skills.is_positive() {
                return Err(SessionError::players("Player skills must be positive"));
            }
            if !BOARD.is_in_bounds(player.position) {
                return Err(SessionError::players("Player positions must be in bounds"));
            }
            if player.position.row != required_row {
                return Err(SessionError::players(format!(
                    "Players must be placed on row {}",
                    required_row
                )));
            }
            if !incoming.insert(player.position) {
                return Err(SessionError::players("Player positions must be unique"));
            }
            if occupied.contains(&player.position) {
                return Err(SessionError::players("Player positions overlap another player"));
            }
        }

        Ok(())
    }
}

/// All live sessions of this process
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
    subscriber_buffer: usize,
}

impl SessionStore {
    /// `subscriber_buffer` bounds how many snapshots may queue per subscriber
    pub fn new(subscriber_buffer: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            subscriber_buffer,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn subscriber_buffer(&self) -> usize {
        self.subscriber_buffer
    }

    fn new_team(name: String, side: TeamSide) -> Team {
        Team::new(Uuid::new_v4().to_string(), name, side)
    }

    /// Open a session with one team on `side`
    pub fn create_session(&self, team_name: String, side: TeamSide) -> JoinedSession {
        let team = Self::new_team(team_name, side);
        let team_id = team.id.clone();
        let session = Session::new(team, self.subscriber_buffer);
        let view = session.to_view();

        info!(session = %session.id, team = %team_id, ?side, "Session created");
        self.sessions.insert(session.id, session);

        JoinedSession {
            session: view,
            team_id,
        }
    }

    /// Add the second team on the side opposite the first
    pub fn join_session(
        &self,
        session_id: Uuid,
        team_name: String,
    ) -> Result<JoinedSession, SessionError> {
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(SessionError::SessionNotFound)?;

        let side = match session.game_state.teams.as_slice() {
            [existing] => existing.side.opposite(),
            _ => return Err(SessionError::SessionFull),
        };

        let team = Self::new_team(team_name, side);
        let team_id = team.id.clone();
        session.game_state.teams.push(team);

        info!(session = %session_id, team = %team_id, ?side, "Team joined");
        Ok(JoinedSession {
            session: session.publish(),
            team_id,
        })
    }

    /// Replace a team's line-up
    pub fn place_players(
        &self,
        session_id: Uuid,
        team_id: &str,
        players: Vec<Player>,
    ) -> Result<SessionView, SessionError> {
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(SessionError::SessionNotFound)?;

        let team = session
            .game_state
            .get_team(team_id)
            .ok_or(SessionError::TeamNotFound)?;
        session.validate_players(team, &players)?;

        if let Some(team) = session
            .game_state
            .teams
            .iter_mut()
            .find(|t| t.id == team_id)
        {
            team.players = players;
        }

        info!(session = %session_id, team = %team_id, "Players placed");
        Ok(session.publish())
    }

    /// Put the ball on the midline and start the first turn.
    ///
    /// The placing team yields the first move to its opponent.
    pub fn place_ball(
        &self,
        session_id: Uuid,
        team_id: &str,
        position: OffsetCoord,
    ) -> Result<SessionView, SessionError> {
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(SessionError::SessionNotFound)?;

        if session.game_state.teams.len() < 2 {
            return Err(SessionError::ball("Both teams must join before placing the ball"));
        }
        let team = session
            .game_state
            .get_team(team_id)
            .ok_or(SessionError::TeamNotFound)?;
        if !BOARD.is_midline_hex(position) {
            return Err(SessionError::ball("Ball must be placed on the midline in bounds"));
        }
        if session.game_state.is_occupied(position) {
            return Err(SessionError::ball("Ball cannot be placed on a player"));
        }
        let opponent = session
            .game_state
            .other_team(&team.id)
            .ok_or_else(|| SessionError::ball("Missing opponent team"))?;

        let placer_id = team.id.clone();
        let opponent_id = opponent.id.clone();
        let turn_state = TurnState::new(
            [placer_id.clone(), opponent_id.clone()],
            Some(&opponent_id),
            1,
        );

        session.game_state.ball = Ball::loose(position);
        session.game_state.active_team_id = opponent_id.clone();
        session.game_state.round = 1;
        session.turn_state = Some(turn_state);
        session.ball_placed_by_team_id = Some(placer_id);

        info!(session = %session_id, kickoff = %opponent_id, "Ball placed");
        Ok(session.publish())
    }

    /// Validate and apply one game action against both the rules and the turn.
    pub fn submit_action(
        &self,
        session_id: Uuid,
        action: GameAction,
    ) -> Result<SessionView, SessionError> {
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(SessionError::SessionNotFound)?;

        let turn_state = session.turn_state.as_ref().ok_or(SessionError::TurnNotReady)?;
        if turn_state.actions_remaining == 0 {
            return Err(SessionError::NoActionsRemaining);
        }

        let next_state = session.game_state.apply_action(&action).map_err(|e| {
            debug!(
                session = %session_id,
                action = action.kind(),
                code = e.code(),
                "Action rejected"
            );
            SessionError::ActionInvalid {
                message: e.to_string(),
                action_error: Some(e),
            }
        })?;
        let queued = turn_state
            .queue_action(&action)
            .map_err(|e| {
                debug!(session = %session_id, code = e.code(), "Turn rejected action");
                SessionError::ActionInvalid {
                    message: format!("Turn action rejected: {}", e),
                    action_error: None,
                }
            })?;

        let mut merged = next_state;
        merged.active_team_id = queued.state.active_team_id.clone();
        merged.round = queued.state.round;

        info!(
            session = %session_id,
            action = action.kind(),
            team = action.team_id(),
            player = action.player_id(),
            switched = queued.switched,
            "Action applied"
        );
        session.game_state = merged;
        session.turn_state = Some(queued.state);
        Ok(session.publish())
    }

    pub fn get_session(&self, session_id: Uuid) -> Result<SessionView, SessionError> {
        self.sessions
            .get(&session_id)
            .map(|session| session.to_view())
            .ok_or(SessionError::SessionNotFound)
    }

    /// Legal run paths and pass targets for a player in the current state
    pub fn list_targets(
        &self,
        session_id: Uuid,
        player_id: &str,
    ) -> Result<(Vec<RunTarget>, Vec<PassTarget>), SessionError> {
        let session = self
            .sessions
            .get(&session_id)
            .ok_or(SessionError::SessionNotFound)?;

        let run = run_targets(&session.game_state, player_id);
        let mut pass: Vec<PassTarget> = pass_targets(&session.game_state, player_id)
            .into_values()
            .collect();
        pass.sort_by_key(|t| (t.distance, t.coord));
        Ok((run, pass))
    }

    /// Start watching a session; the current snapshot arrives first.
    pub fn subscribe(&self, session_id: Uuid) -> Result<Subscription<SessionEvent>, SessionError> {
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(SessionError::SessionNotFound)?;

        let snapshot = SessionEvent::State(session.to_view());
        let subscription = session.subscribers.subscribe(snapshot);
        debug!(session = %session_id, subscriber = subscription.id, "Subscriber added");
        Ok(subscription)
    }

    /// Returns whether the subscriber was still registered
    pub fn unsubscribe(&self, session_id: Uuid, subscriber: SubscriberId) -> bool {
        let removed = self
            .sessions
            .get_mut(&session_id)
            .map(|mut session| session.subscribers.unsubscribe(subscriber))
            .unwrap_or(false);
        if removed {
            debug!(session = %session_id, subscriber, "Subscriber removed");
        }
        removed
    }
}
