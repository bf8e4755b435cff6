//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{SessionError, SessionEvent, SessionStore};
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::hub::{SubscriberId, Subscription};
use crate::session::ErrorPayload;

/// Server state shared across all connections.
pub struct ServerState {
    pub store: SessionStore,
}

impl ServerState {
    pub fn new(subscriber_buffer: usize) -> Self {
        Self {
            store: SessionStore::new(subscriber_buffer),
        }
    }
}

/// Subscription ended by its forwarder: the client fell behind or the hub
/// dropped it.
type Ended = (Uuid, SubscriberId);

/// One connection's live subscriptions, keyed by session.
///
/// Stream events go through a bounded queue separate from replies. A client
/// that stops reading fills it, and each forwarder that hits the limit ends
/// its subscription instead of waiting.
struct ConnectionSubscriptions {
    active: HashMap<Uuid, (SubscriberId, JoinHandle<()>)>,
    events: mpsc::Sender<ServerMessage>,
    ended: mpsc::UnboundedSender<Ended>,
}

impl ConnectionSubscriptions {
    fn new(
        event_capacity: usize,
    ) -> (
        Self,
        mpsc::Receiver<ServerMessage>,
        mpsc::UnboundedReceiver<Ended>,
    ) {
        let (events, events_rx) = mpsc::channel(event_capacity.max(1));
        let (ended, ended_rx) = mpsc::unbounded_channel();
        let subs = Self {
            active: HashMap::new(),
            events,
            ended,
        };
        (subs, events_rx, ended_rx)
    }

    /// Forward a hub subscription to this connection's event queue
    fn attach(
        &mut self,
        session_id: Uuid,
        mut subscription: Subscription<SessionEvent>,
        store: &SessionStore,
    ) {
        let subscriber = subscription.id;
        let events = self.events.clone();
        let ended = self.ended.clone();

        let task = tokio::spawn(async move {
            while let Some(event) = subscription.receiver.recv().await {
                let SessionEvent::State(session) = event;
                if let Err(e) = events.try_send(ServerMessage::State { session }) {
                    debug!(session = %session_id, subscriber, "Ending subscription: {}", e);
                    break;
                }
            }
            let _ = ended.send((session_id, subscriber));
        });

        if let Some(previous) = self.active.insert(session_id, (subscriber, task)) {
            Self::close(session_id, previous, store);
        }
    }

    fn remove(&mut self, session_id: Uuid, store: &SessionStore) -> bool {
        match self.active.remove(&session_id) {
            Some(entry) => {
                Self::close(session_id, entry, store);
                true
            }
            None => false,
        }
    }

    /// Drop the entry for a forwarder that stopped on its own.
    ///
    /// Returns false when the entry was already replaced or removed.
    fn finish(&mut self, (session_id, subscriber): Ended, store: &SessionStore) -> bool {
        match self.active.get(&session_id) {
            Some((current, _)) if *current == subscriber => self.remove(session_id, store),
            _ => false,
        }
    }

    fn clear(&mut self, store: &SessionStore) {
        for (session_id, entry) in self.active.drain() {
            Self::close(session_id, entry, store);
        }
    }

    fn close(
        session_id: Uuid,
        (subscriber, task): (SubscriberId, JoinHandle<()>),
        store: &SessionStore,
    ) {
        store.unsubscribe(session_id, subscriber);
        task.abort();
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Hexkick server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let client_id = Uuid::new_v4();

    // Replies and notices; stream events have their own bounded queue
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let (mut subscriptions, mut events_rx, mut ended_rx) =
        ConnectionSubscriptions::new(state.store.subscriber_buffer());

    let welcome = ServerMessage::Welcome { client_id };
    ws_sender
        .send(Message::Text(serde_json::to_string(&welcome)?))
        .await?;

    let send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                biased;
                Some(msg) = rx.recv() => msg,
                Some(msg) = events_rx.recv() => msg,
                else => break,
            };
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode message: {}", e),
            }
        }
    });

    loop {
        tokio::select! {
            msg = ws_receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => {
                            handle_message(client_msg, &state, &tx, &mut subscriptions);
                        }
                        Err(e) => {
                            warn!("Invalid message from {}: {}", client_id, e);
                            let _ = tx.send(ServerMessage::Error {
                                error: ErrorPayload {
                                    code: "bad_request".into(),
                                    message: e.to_string(),
                                    action_error: None,
                                },
                            });
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("Client {} closing connection", client_id);
                    break;
                }
                Some(Ok(Message::Ping(_))) => {
                    let _ = tx.send(ServerMessage::Pong);
                }
                Some(Err(e)) => {
                    error!("WebSocket error from {}: {}", client_id, e);
                    break;
                }
                Some(Ok(_)) => {}
            },
            Some(ended) = ended_rx.recv() => {
                subscription_ended(ended, &state.store, &tx, &mut subscriptions);
            }
        }
    }

    subscriptions.clear(&state.store);
    drop(tx);
    send_task.abort();

    info!("Connection closed for {}", client_id);
    Ok(())
}

/// Tell the client a subscription it did not cancel is gone
fn subscription_ended(
    ended: Ended,
    store: &SessionStore,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    subscriptions: &mut ConnectionSubscriptions,
) {
    let (session_id, subscriber) = ended;
    if subscriptions.finish(ended, store) {
        info!(session = %session_id, subscriber, "Subscriber fell behind");
        let _ = tx.send(ServerMessage::Unsubscribed { session_id });
    }
}

fn send_error(tx: &mpsc::UnboundedSender<ServerMessage>, e: SessionError) {
    debug!(code = e.code(), "Request failed: {}", e);
    let _ = tx.send(ServerMessage::Error { error: e.payload() });
}

/// Send the success message, or the error payload
fn reply<T>(
    tx: &mpsc::UnboundedSender<ServerMessage>,
    result: Result<T, SessionError>,
    on_ok: impl FnOnce(T) -> ServerMessage,
) {
    match result {
        Ok(value) => {
            let _ = tx.send(on_ok(value));
        }
        Err(e) => send_error(tx, e),
    }
}

/// Handle a client message.
fn handle_message(
    msg: ClientMessage,
    state: &Arc<ServerState>,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    subscriptions: &mut ConnectionSubscriptions,
) {
    let store = &state.store;

    match msg {
        ClientMessage::CreateSession { team_name, side } => {
            let joined = store.create_session(team_name, side);
            let _ = tx.send(ServerMessage::SessionJoined {
                session: joined.session,
                team_id: joined.team_id,
            });
        }

        ClientMessage::JoinSession {
            session_id,
            team_name,
        } => reply(tx, store.join_session(session_id, team_name), |joined| {
            ServerMessage::SessionJoined {
                session: joined.session,
                team_id: joined.team_id,
            }
        }),

        ClientMessage::PlacePlayers {
            session_id,
            team_id,
            players,
        } => reply(
            tx,
            store.place_players(session_id, &team_id, players),
            |session| ServerMessage::Session { session },
        ),

        ClientMessage::PlaceBall {
            session_id,
            team_id,
            position,
        } => reply(
            tx,
            store.place_ball(session_id, &team_id, position),
            |session| ServerMessage::Session { session },
        ),

        ClientMessage::SubmitAction { session_id, action } => reply(
            tx,
            store.submit_action(session_id, action),
            |session| ServerMessage::Session { session },
        ),

        ClientMessage::GetSession { session_id } => {
            reply(tx, store.get_session(session_id), |session| {
                ServerMessage::Session { session }
            })
        }

        ClientMessage::Subscribe { session_id } => match store.subscribe(session_id) {
            Ok(subscription) => subscriptions.attach(session_id, subscription, store),
            Err(e) => send_error(tx, e),
        },

        ClientMessage::Unsubscribe { session_id } => {
            if subscriptions.remove(session_id, store) {
                let _ = tx.send(ServerMessage::Unsubscribed { session_id });
            } else {
                send_error(tx, SessionError::SessionNotFound);
            }
        }

        ClientMessage::ListTargets {
            session_id,
            player_id,
        } => reply(
            tx,
            store.list_targets(session_id, &player_id),
            |(run, pass)| ServerMessage::Targets {
                player_id,
                run,
                pass,
            },
        ),

        ClientMessage::Ping => {
            let _ = tx.send(ServerMessage::Pong);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexkick_core::TeamSide;

    /// Both ends of one connection, without the socket
    struct TestClient {
        state: Arc<ServerState>,
        tx: mpsc::UnboundedSender<ServerMessage>,
        replies: mpsc::UnboundedReceiver<ServerMessage>,
        events: mpsc::Receiver<ServerMessage>,
        ended: mpsc::UnboundedReceiver<Ended>,
        subs: ConnectionSubscriptions,
    }

    impl TestClient {
        fn new(event_capacity: usize) -> Self {
            let (tx, replies) = mpsc::unbounded_channel();
            let (subs, events, ended) = ConnectionSubscriptions::new(event_capacity);
            Self {
                state: Arc::new(ServerState::new(8)),
                tx,
                replies,
                events,
                ended,
                subs,
            }
        }

        fn send(&mut self, msg: ClientMessage) {
            handle_message(msg, &self.state, &self.tx, &mut self.subs);
        }

        fn last_reply(&mut self) -> Option<ServerMessage> {
            let mut last = None;
            while let Ok(msg) = self.replies.try_recv() {
                last = Some(msg);
            }
            last
        }
    }

    #[tokio::test]
    async fn test_create_and_join_over_messages() {
        let mut client = TestClient::new(8);

        client.send(ClientMessage::CreateSession {
            team_name: "North".into(),
            side: TeamSide::Top,
        });
        let session_id = match client.last_reply() {
            Some(ServerMessage::SessionJoined { session, .. }) => session.id,
            other => panic!("unexpected reply: {other:?}"),
        };

        client.send(ClientMessage::JoinSession {
            session_id,
            team_name: "South".into(),
        });
        assert!(matches!(
            client.last_reply(),
            Some(ServerMessage::SessionJoined { .. })
        ));

        client.send(ClientMessage::JoinSession {
            session_id,
            team_name: "Third".into(),
        });
        match client.last_reply() {
            Some(ServerMessage::Error { error }) => assert_eq!(error.code, "session_full"),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_subscription_forwards_state_events() {
        let mut client = TestClient::new(8);
        let created = client
            .state
            .store
            .create_session("North".into(), TeamSide::Top);
        let session_id = created.session.id;

        client.send(ClientMessage::Subscribe { session_id });
        match client.events.recv().await {
            Some(ServerMessage::State { session }) => assert_eq!(session, created.session),
            other => panic!("unexpected event: {other:?}"),
        }

        client
            .state
            .store
            .join_session(session_id, "South".into())
            .unwrap();
        match client.events.recv().await {
            Some(ServerMessage::State { session }) => {
                assert_eq!(session.game_state.teams.len(), 2)
            }
            other => panic!("unexpected event: {other:?}"),
        }

        client.send(ClientMessage::Unsubscribe { session_id });
        assert!(matches!(
            client.last_reply(),
            Some(ServerMessage::Unsubscribed { .. })
        ));
        assert!(client.subs.active.is_empty());
    }

    #[tokio::test]
    async fn test_client_that_stops_reading_is_unsubscribed() {
        let mut client = TestClient::new(1);
        let created = client
            .state
            .store
            .create_session("North".into(), TeamSide::Top);
        let session_id = created.session.id;

        // The snapshot fills the event queue and nobody drains it.
        client.send(ClientMessage::Subscribe { session_id });
        client
            .state
            .store
            .join_session(session_id, "South".into())
            .unwrap();

        let ended = client.ended.recv().await.unwrap();
        assert_eq!(ended.0, session_id);
        subscription_ended(ended, &client.state.store, &client.tx, &mut client.subs);

        match client.last_reply() {
            Some(ServerMessage::Unsubscribed { session_id: id }) => assert_eq!(id, session_id),
            other => panic!("unexpected reply: {other:?}"),
        }
        assert!(client.subs.active.is_empty());
        assert!(!client.state.store.unsubscribe(session_id, ended.1));

        // Only the snapshot made it through.
        assert!(matches!(
            client.events.try_recv(),
            Ok(ServerMessage::State { .. })
        ));
        assert!(client.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stale_end_after_resubscribe_is_ignored() {
        let mut client = TestClient::new(8);
        let created = client
            .state
            .store
            .create_session("North".into(), TeamSide::Top);
        let session_id = created.session.id;

        client.send(ClientMessage::Subscribe { session_id });
        let first = client.subs.active[&session_id].0;
        client.send(ClientMessage::Subscribe { session_id });

        subscription_ended(
            (session_id, first),
            &client.state.store,
            &client.tx,
            &mut client.subs,
        );
        assert!(client.last_reply().is_none());
        assert_eq!(client.subs.active.len(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_to_missing_session() {
        let mut client = TestClient::new(8);

        client.send(ClientMessage::Subscribe {
            session_id: Uuid::new_v4(),
        });
        match client.last_reply() {
            Some(ServerMessage::Error { error }) => assert_eq!(error.code, "session_not_found"),
            other => panic!("unexpected reply: {other:?}"),
        }
    }
}
