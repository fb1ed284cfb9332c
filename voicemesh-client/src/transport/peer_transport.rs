use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use voicemesh_core::PeerId;

/// A connectivity candidate in wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateInit {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

/// Events a peer transport feeds back into the orchestrator loop.
#[derive(Debug)]
pub enum TransportEvent {
    /// A locally discovered candidate, forwarded to the remote peer
    /// immediately (trickle, never batched).
    CandidateDiscovered(PeerId, CandidateInit),
    /// The underlying connection failed or closed.
    Disconnected(PeerId),
}

/// One point-to-point media transport handle, keyed by the remote peer it
/// connects to. The engine behind it owns connectivity establishment,
/// encryption and audio transport; this contract only drives negotiation.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Generate a local offer and install it as the local description.
    async fn create_offer(&self) -> Result<String>;

    /// Apply a remote offer, generate an answer and install it locally.
    /// Returns the answer to send back.
    async fn accept_offer(&self, sdp: String) -> Result<String>;

    /// Apply a remote answer as the remote description.
    async fn accept_answer(&self, sdp: String) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: CandidateInit) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait PeerTransportFactory: Send + Sync {
    /// Build a transport toward `remote` with all current local tracks
    /// attached, wiring its events into `events`.
    async fn create(
        &self,
        remote: PeerId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>>;
}
