use crate::media::{LocalMedia, MediaSinkRegistry};
use crate::session::{ClientCommand, NegotiationRole, PeerSession, RoomEvents, SessionState};
use crate::signaling::SignalSink;
use crate::transport::{CandidateInit, PeerTransportFactory, TransportEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use voicemesh_core::{ClientMessage, PeerId, ServerMessage, SignalPayload};

/// Client-side coordinator: reacts to membership events and inbound signals,
/// owns the one-session-per-remote-peer registry and decides who initiates.
///
/// Runs as a single event loop; every shared structure here is mutated only
/// inside that loop, and a failure in one peer session never disturbs the
/// others.
pub struct SessionOrchestrator {
    local_id: PeerId,
    server_rx: mpsc::Receiver<ServerMessage>,
    command_rx: mpsc::Receiver<ClientCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
    sessions: HashMap<PeerId, PeerSession>,
    signals: Arc<dyn SignalSink>,
    transports: Arc<dyn PeerTransportFactory>,
    sinks: Arc<dyn MediaSinkRegistry>,
    media: Arc<dyn LocalMedia>,
    events: Arc<dyn RoomEvents>,
    muted: bool,
    ptt_held: bool,
}

impl SessionOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        local_id: PeerId,
        server_rx: mpsc::Receiver<ServerMessage>,
        command_rx: mpsc::Receiver<ClientCommand>,
        signals: Arc<dyn SignalSink>,
        transports: Arc<dyn PeerTransportFactory>,
        sinks: Arc<dyn MediaSinkRegistry>,
        media: Arc<dyn LocalMedia>,
        events: Arc<dyn RoomEvents>,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(256);

        Self {
            local_id,
            server_rx,
            command_rx,
            transport_rx,
            transport_tx,
            sessions: HashMap::new(),
            signals,
            transports,
            sinks,
            media,
            events,
            muted: false,
            ptt_held: false,
        }
    }

    pub async fn run(mut self) {
        info!("Session orchestrator started for {}", self.local_id);

        loop {
            tokio::select! {
                msg = self.server_rx.recv() => {
                    match msg {
                        Some(m) => self.handle_server_message(m).await,
                        None => {
                            info!("Server channel closed. Leaving room.");
                            break;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!("Transport channel closed unexpectedly");
                            break;
                        }
                    }
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(ClientCommand::Leave) | None => break,
                        Some(c) => self.handle_command(c),
                    }
                }
            }
        }

        self.shutdown().await;
        info!("Session orchestrator finished for {}", self.local_id);
    }

    async fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome { peer_id } => {
                debug!("Relay confirmed identity {}", peer_id);
            }

            // Initial member list: we are the newcomer, so we initiate toward
            // every pre-existing member.
            ServerMessage::Peers { peers } => {
                for participant in peers {
                    self.events
                        .on_peer_joined(participant.id.clone(), participant.display_name)
                        .await;

                    if self.sessions.contains_key(&participant.id) {
                        continue;
                    }
                    if let Some(session) = self
                        .get_or_create(participant.id.clone(), NegotiationRole::Initiator)
                        .await
                    {
                        session.start_negotiation().await;
                    }
                }
            }

            // The new member initiates toward us; nothing to do but show it.
            ServerMessage::PeerJoined { peer, display_name } => {
                self.events.on_peer_joined(peer, display_name).await;
            }

            ServerMessage::PeerLeft { peer } => {
                self.teardown_session(&peer).await;
                self.events.on_peer_left(peer).await;
            }

            ServerMessage::Signal { from, payload } => {
                self.handle_signal(from, payload).await;
            }
        }
    }

    async fn handle_signal(&mut self, from: PeerId, payload: SignalPayload) {
        match payload {
            SignalPayload::Offer { sdp } => {
                // Glare: both sides initiated at once. The lexicographically
                // lesser identity keeps the initiator role.
                let glare = self.sessions.get(&from).is_some_and(|s| {
                    s.role() == NegotiationRole::Initiator
                        && s.state() == SessionState::Negotiating
                });
                if glare {
                    if self.local_id < from {
                        info!("Glare with {}: keeping initiator role", from);
                        return;
                    }
                    info!("Glare with {}: yielding initiator role", from);
                    if let Some(mut old) = self.sessions.remove(&from) {
                        old.close().await;
                    }
                }

                if let Some(session) = self.get_or_create(from, NegotiationRole::Responder).await {
                    session.handle_offer(sdp).await;
                }
            }

            SignalPayload::Answer { sdp } => match self.sessions.get_mut(&from) {
                Some(session) => session.handle_answer(sdp).await,
                None => warn!("Answer from {} without a session", from),
            },

            SignalPayload::IceCandidate {
                candidate,
                sdp_mid,
                sdp_m_line_index,
            } => {
                let candidate = CandidateInit {
                    candidate,
                    sdp_mid,
                    sdp_m_line_index,
                };
                if let Some(session) = self.get_or_create(from, NegotiationRole::Responder).await {
                    session.handle_candidate(candidate).await;
                }
            }
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateDiscovered(peer, candidate) => {
                // A torn-down transport may still flush candidates; drop them.
                if !self.sessions.contains_key(&peer) {
                    return;
                }
                self.signals
                    .send(ClientMessage::Signal {
                        to: peer,
                        payload: SignalPayload::IceCandidate {
                            candidate: candidate.candidate,
                            sdp_mid: candidate.sdp_mid,
                            sdp_m_line_index: candidate.sdp_m_line_index,
                        },
                    })
                    .await;
            }

            TransportEvent::Disconnected(peer) => {
                info!("Transport disconnected for {}", peer);
                self.teardown_session(&peer).await;
            }
        }
    }

    fn handle_command(&mut self, cmd: ClientCommand) {
        match cmd {
            ClientCommand::SetMuted(muted) => {
                self.muted = muted;
                self.apply_mic_state();
            }
            ClientCommand::SetPushToTalk(held) => {
                self.ptt_held = held;
                self.apply_mic_state();
            }
            ClientCommand::Leave => {}
        }
    }

    // Mute only flips the capture flag; sessions and tracks are untouched.
    fn apply_mic_state(&self) {
        self.media.set_enabled(self.ptt_held || !self.muted);
    }

    /// One session per remote peer: returns the existing session untouched,
    /// or builds one with the given role.
    async fn get_or_create(
        &mut self,
        remote: PeerId,
        role: NegotiationRole,
    ) -> Option<&mut PeerSession> {
        if !self.sessions.contains_key(&remote) {
            let transport = match self
                .transports
                .create(remote.clone(), self.transport_tx.clone())
                .await
            {
                Ok(t) => t,
                Err(e) => {
                    error!("Failed to create transport for {}: {:?}", remote, e);
                    return None;
                }
            };
            self.sessions.insert(
                remote.clone(),
                PeerSession::new(remote.clone(), role, transport, self.signals.clone()),
            );
        }
        self.sessions.get_mut(&remote)
    }

    async fn teardown_session(&mut self, peer: &PeerId) {
        let Some(mut session) = self.sessions.remove(peer) else {
            return;
        };
        session.close().await;
        self.sinks.remove(peer);
    }

    async fn shutdown(&mut self) {
        let peers: Vec<PeerId> = self.sessions.keys().cloned().collect();
        for peer in peers {
            self.teardown_session(&peer).await;
        }
    }
}
