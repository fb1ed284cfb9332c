use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};
use voicemesh_core::{PeerId, ServerMessage, SignalPayload};

/// Directory of connected peers and the relay built on top of it. Delivery is
/// fire-and-forget: a message for a peer that is gone is dropped, and the
/// eventual `PeerLeft` broadcast heals the senders that still reference it.
#[derive(Clone, Default)]
pub struct SignalingService {
    peers: Arc<DashMap<PeerId, mpsc::UnboundedSender<Message>>>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.peers.remove(peer_id);
    }

    /// Serialize and deliver one message to one peer.
    pub fn send(&self, peer_id: &PeerId, msg: &ServerMessage) {
        if let Some(peer) = self.peers.get(peer_id) {
            match serde_json::to_string(msg) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to send WS message to {}: {:?}", peer_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize server message: {}", e),
            }
        } else {
            warn!("Dropping message for disconnected peer {}", peer_id);
        }
    }

    /// Deliver one message to an enumerated set of recipients.
    pub fn broadcast(&self, peers: &[PeerId], msg: &ServerMessage) {
        for peer_id in peers {
            self.send(peer_id, msg);
        }
    }

    /// Forward a negotiation payload to its addressee, stamped with the
    /// sender's identity. No validation, no buffering.
    pub fn relay(&self, from: PeerId, to: &PeerId, payload: SignalPayload) {
        self.send(to, &ServerMessage::Signal { from, payload });
    }
}
