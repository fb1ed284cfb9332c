use crate::model::participant::Participant;
use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// One session-negotiation message. The relay forwards these opaquely; only
/// the two peer sessions involved interpret them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum SignalPayload {
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    IceCandidate {
        candidate: String,
        sdp_mid: Option<String>,
        sdp_m_line_index: Option<u16>,
    },
}

/// Client-to-relay messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ClientMessage {
    Join {
        room: String,
        display_name: String,
    },
    Signal {
        to: PeerId,
        payload: SignalPayload,
    },
}

/// Relay-to-client messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Sent once on connect with the relay-assigned identity.
    Welcome { peer_id: PeerId },
    /// Pre-existing room members, in join order, sent to a new joiner.
    Peers { peers: Vec<Participant> },
    PeerJoined { peer: PeerId, display_name: String },
    PeerLeft { peer: PeerId },
    Signal { from: PeerId, payload: SignalPayload },
}
