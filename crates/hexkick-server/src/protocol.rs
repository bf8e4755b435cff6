//! WebSocket protocol messages for Hexkick sessions.

use hexkick_core::{
    GameAction, OffsetCoord, PassTarget, Player, PlayerId, RunTarget, TeamId, TeamSide,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{ErrorPayload, SessionView};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Open a new session with the first team
    CreateSession {
        team_name: String,
        #[serde(default)]
        side: TeamSide,
    },

    /// Add the second team to a session
    JoinSession { session_id: Uuid, team_name: String },

    /// Line up a team before kickoff
    PlacePlayers {
        session_id: Uuid,
        team_id: TeamId,
        players: Vec<Player>,
    },

    /// Place the ball on the midline and start play
    PlaceBall {
        session_id: Uuid,
        team_id: TeamId,
        position: OffsetCoord,
    },

    /// Submit a run, pass or discard
    SubmitAction { session_id: Uuid, action: GameAction },

    /// Fetch the current snapshot
    GetSession { session_id: Uuid },

    /// Start receiving `state` events for a session
    Subscribe { session_id: Uuid },

    /// Stop receiving `state` events for a session
    Unsubscribe { session_id: Uuid },

    /// Legal run and pass destinations for a player
    ListTargets { session_id: Uuid, player_id: PlayerId },

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Welcome message with the connection ID
    Welcome { client_id: Uuid },

    /// Session created or joined; `team_id` is the caller's team
    SessionJoined { session: SessionView, team_id: TeamId },

    /// Reply to a successful operation or `getSession`
    Session { session: SessionView },

    /// Update stream event
    State { session: SessionView },

    /// Reply to `listTargets`
    Targets {
        player_id: PlayerId,
        run: Vec<RunTarget>,
        pass: Vec<PassTarget>,
    },

    /// Subscription closed
    Unsubscribed { session_id: Uuid },

    /// Operation failed
    Error { error: ErrorPayload },

    /// Pong response
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults_to_top() {
        let json = r#"{"type":"createSession","payload":{"teamName":"North"}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::CreateSession { team_name, side } => {
                assert_eq!(team_name, "North");
                assert_eq!(side, TeamSide::Top);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_submit_action_parses_nested_action() {
        let session_id = Uuid::new_v4();
        let json = serde_json::json!({
            "type": "submitAction",
            "payload": {
                "sessionId": session_id,
                "action": {
                    "type": "pass",
                    "teamId": "t1",
                    "playerId": "p1",
                    "direction": { "q": 1, "r": 0 },
                    "distance": 2
                }
            }
        });
        let msg: ClientMessage = serde_json::from_value(json).unwrap();
        match msg {
            ClientMessage::SubmitAction { session_id: id, action } => {
                assert_eq!(id, session_id);
                assert_eq!(action.kind(), "pass");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_ping_has_no_payload() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
        assert_eq!(serde_json::to_string(&ServerMessage::Pong).unwrap(), r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_error_message_shape() {
        let msg = ServerMessage::Error {
            error: ErrorPayload {
                code: "session_full".into(),
                message: "Session already has two teams".into(),
                action_error: None,
            },
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["payload"]["error"]["code"], "session_full");
    }
}
