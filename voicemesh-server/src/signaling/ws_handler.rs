use crate::room::RoomRegistry;
use crate::signaling::SignalingService;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use voicemesh_core::{ClientMessage, Participant, PeerId, ServerMessage, SignalPayload};

pub struct AppState {
    pub signaling: SignalingService,
    pub registry: RoomRegistry,
}

impl AppState {
    /// Register the peer in a room, send it the pre-existing member list and
    /// announce it to everyone already there.
    pub fn handle_join(&self, peer_id: &PeerId, room: &str, display_name: &str) {
        let participant = Participant::with_fallback_name(peer_id.clone(), display_name);
        let display_name = participant.display_name.clone();

        let outcome = self.registry.join(room, participant);

        if let Some(departure) = outcome.displaced {
            self.signaling.broadcast(
                &departure.remaining,
                &ServerMessage::PeerLeft {
                    peer: peer_id.clone(),
                },
            );
        }

        let recipients: Vec<PeerId> = outcome.peers.iter().map(|p| p.id.clone()).collect();

        self.signaling.send(
            peer_id,
            &ServerMessage::Peers {
                peers: outcome.peers,
            },
        );
        self.signaling.broadcast(
            &recipients,
            &ServerMessage::PeerJoined {
                peer: peer_id.clone(),
                display_name,
            },
        );
    }

    pub fn handle_signal(&self, from: PeerId, to: &PeerId, payload: SignalPayload) {
        self.signaling.relay(from, to, payload);
    }

    /// Drop the peer from its room and tell the remaining members. Safe to
    /// call for peers that never joined.
    pub fn handle_disconnect(&self, peer_id: &PeerId) {
        if let Some(departure) = self.registry.leave(peer_id) {
            self.signaling.broadcast(
                &departure.remaining,
                &ServerMessage::PeerLeft {
                    peer: peer_id.clone(),
                },
            );
        }
        self.signaling.remove_peer(peer_id);
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let peer_id = PeerId::new();
    info!("New WebSocket connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_peer(peer_id.clone(), tx);
    state.signaling.send(
        &peer_id,
        &ServerMessage::Welcome {
            peer_id: peer_id.clone(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::Join { room, display_name }) => {
                            state.handle_join(&peer_id, &room, &display_name);
                        }
                        Ok(ClientMessage::Signal { to, payload }) => {
                            state.handle_signal(peer_id.clone(), &to, payload);
                        }
                        Err(e) => warn!("Invalid client message from {}: {:?}", peer_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.handle_disconnect(&peer_id);
    info!("WebSocket disconnected: {}", peer_id);
}
