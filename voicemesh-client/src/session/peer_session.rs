use crate::signaling::SignalSink;
use crate::transport::{CandidateInit, PeerTransport};
use std::sync::Arc;
use tracing::{error, warn};
use voicemesh_core::{ClientMessage, PeerId, SignalPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Negotiating,
    Connected,
    Closed,
}

/// Fixed at creation; sessions are never renegotiated with the roles swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    Initiator,
    Responder,
}

/// Negotiation state for one remote peer. All methods run on the
/// orchestrator's single event loop, so no two transitions for the same
/// session ever interleave; once `Closed`, every inbound event is a no-op.
pub struct PeerSession {
    remote: PeerId,
    role: NegotiationRole,
    state: SessionState,
    transport: Arc<dyn PeerTransport>,
    signals: Arc<dyn SignalSink>,
    // Candidates that arrived before the remote description; applied once,
    // in arrival order, as soon as the description lands.
    pending_candidates: Vec<CandidateInit>,
    remote_description_set: bool,
}

impl PeerSession {
    pub fn new(
        remote: PeerId,
        role: NegotiationRole,
        transport: Arc<dyn PeerTransport>,
        signals: Arc<dyn SignalSink>,
    ) -> Self {
        Self {
            remote,
            role,
            state: SessionState::Idle,
            transport,
            signals,
            pending_candidates: Vec::new(),
            remote_description_set: false,
        }
    }

    pub fn remote(&self) -> &PeerId {
        &self.remote
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Initiator path: offer out, wait for the answer.
    pub async fn start_negotiation(&mut self) {
        if self.state != SessionState::Idle {
            return;
        }
        match self.transport.create_offer().await {
            Ok(sdp) => {
                self.state = SessionState::Negotiating;
                self.send_signal(SignalPayload::Offer { sdp }).await;
            }
            Err(e) => error!("Failed to create offer for {}: {:?}", self.remote, e),
        }
    }

    /// Responder path: apply the remote offer and answer it. Signaling is
    /// complete for the responder once the answer is out.
    pub async fn handle_offer(&mut self, sdp: String) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Negotiating;
        match self.transport.accept_offer(sdp).await {
            Ok(answer) => {
                self.remote_description_set = true;
                self.flush_candidates().await;
                self.send_signal(SignalPayload::Answer { sdp: answer }).await;
                self.state = SessionState::Connected;
            }
            Err(e) => error!("Failed to answer offer from {}: {:?}", self.remote, e),
        }
    }

    /// Initiator completion: the remote answer arrived.
    pub async fn handle_answer(&mut self, sdp: String) {
        if self.state != SessionState::Negotiating {
            warn!(
                "Ignoring answer from {} in state {:?}",
                self.remote, self.state
            );
            return;
        }
        match self.transport.accept_answer(sdp).await {
            Ok(()) => {
                self.remote_description_set = true;
                self.flush_candidates().await;
                self.state = SessionState::Connected;
            }
            Err(e) => error!("Failed to apply answer from {}: {:?}", self.remote, e),
        }
    }

    /// Candidates arriving before the remote description are queued, not
    /// dropped; afterwards each is applied as it arrives.
    pub async fn handle_candidate(&mut self, candidate: CandidateInit) {
        if self.state == SessionState::Closed {
            return;
        }
        if !self.remote_description_set {
            self.pending_candidates.push(candidate);
            return;
        }
        self.apply_candidate(candidate).await;
    }

    /// Release the transport. Idempotent; marks the session closed first so
    /// the completion of any in-flight negotiation step becomes a no-op.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        self.pending_candidates.clear();
        if let Err(e) = self.transport.close().await {
            warn!("Failed to close transport for {}: {:?}", self.remote, e);
        }
    }

    async fn flush_candidates(&mut self) {
        for candidate in std::mem::take(&mut self.pending_candidates) {
            self.apply_candidate(candidate).await;
        }
    }

    // A bad candidate is skipped, never fatal to the session.
    async fn apply_candidate(&self, candidate: CandidateInit) {
        if let Err(e) = self.transport.add_ice_candidate(candidate).await {
            warn!("Failed to add ICE candidate for {}: {:?}", self.remote, e);
        }
    }

    async fn send_signal(&self, payload: SignalPayload) {
        self.signals
            .send(ClientMessage::Signal {
                to: self.remote.clone(),
                payload,
            })
            .await;
    }
}
