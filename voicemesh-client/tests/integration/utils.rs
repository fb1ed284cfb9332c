use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::Level;
use voicemesh_client::{
    CandidateInit, ClientCommand, LocalMedia, MediaSinkRegistry, PeerTransport,
    PeerTransportFactory, RoomEvents, SessionOrchestrator, SignalSink, TransportEvent,
};
use voicemesh_core::{ClientMessage, PeerId, ServerMessage, SignalPayload};
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Poll a condition until it holds or the timeout elapses.
pub async fn wait_until<F>(cond: F, timeout_ms: u64) -> bool
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(timeout_ms) {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}

/// Records every outbound envelope instead of sending it anywhere.
#[derive(Default)]
pub struct MockSignalSink {
    sent: Mutex<Vec<ClientMessage>>,
}

impl MockSignalSink {
    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<ClientMessage> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    pub fn signals_to(&self, peer: &PeerId) -> Vec<SignalPayload> {
        self.sent()
            .into_iter()
            .filter_map(|msg| match msg {
                ClientMessage::Signal { to, payload } if &to == peer => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub async fn wait_for_sent(&self, count: usize, timeout_ms: u64) -> bool {
        wait_until(|| self.sent.lock().unwrap().len() >= count, timeout_ms).await
    }
}

#[async_trait]
impl SignalSink for MockSignalSink {
    async fn send(&self, msg: ClientMessage) {
        self.sent.lock().unwrap().push(msg);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    CreateOffer,
    AcceptOffer(String),
    AcceptAnswer(String),
    AddCandidate(String),
    Close,
}

/// Scripted stand-in for a media transport: records the negotiation calls
/// and hands back canned descriptions.
pub struct MockTransport {
    pub remote: PeerId,
    calls: Mutex<Vec<TransportCall>>,
    fail_candidates: AtomicBool,
}

impl MockTransport {
    pub fn new(remote: PeerId) -> Self {
        Self {
            remote,
            calls: Mutex::new(Vec::new()),
            fail_candidates: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn candidate_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, TransportCall::AddCandidate(_)))
            .count()
    }

    pub fn closed(&self) -> bool {
        self.calls().contains(&TransportCall::Close)
    }

    pub fn fail_candidates(&self) {
        self.fail_candidates.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_offer(&self) -> Result<String> {
        self.record(TransportCall::CreateOffer);
        Ok(format!("offer-toward-{}", self.remote))
    }

    async fn accept_offer(&self, sdp: String) -> Result<String> {
        self.record(TransportCall::AcceptOffer(sdp));
        Ok(format!("answer-from-{}", self.remote))
    }

    async fn accept_answer(&self, sdp: String) -> Result<()> {
        self.record(TransportCall::AcceptAnswer(sdp));
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: CandidateInit) -> Result<()> {
        self.record(TransportCall::AddCandidate(candidate.candidate));
        if self.fail_candidates.load(Ordering::SeqCst) {
            bail!("forced candidate failure");
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.record(TransportCall::Close);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockTransportFactory {
    #[allow(clippy::type_complexity)]
    created: Mutex<Vec<(PeerId, Arc<MockTransport>, mpsc::Sender<TransportEvent>)>>,
}

impl MockTransportFactory {
    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// Most recent transport built toward a peer.
    pub fn transport_for(&self, peer: &PeerId) -> Option<Arc<MockTransport>> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(id, _, _)| id == peer)
            .map(|(_, t, _)| t.clone())
    }

    /// Event channel of the transport toward a peer, to inject transport
    /// events as if the engine produced them.
    pub fn events_for(&self, peer: &PeerId) -> Option<mpsc::Sender<TransportEvent>> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(id, _, _)| id == peer)
            .map(|(_, _, tx)| tx.clone())
    }

    pub async fn wait_for_created(&self, count: usize, timeout_ms: u64) -> bool {
        wait_until(|| self.created_count() >= count, timeout_ms).await
    }
}

#[async_trait]
impl PeerTransportFactory for MockTransportFactory {
    async fn create(
        &self,
        remote: PeerId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        let transport = Arc::new(MockTransport::new(remote.clone()));
        self.created
            .lock()
            .unwrap()
            .push((remote, transport.clone(), events));
        Ok(transport)
    }
}

/// Trackless capture stub; only the enabled flag matters to the orchestrator.
pub struct MockLocalMedia {
    enabled: AtomicBool,
}

impl Default for MockLocalMedia {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
        }
    }
}

impl MockLocalMedia {
    pub fn enabled_flag(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl LocalMedia for MockLocalMedia {
    fn tracks(&self) -> Vec<Arc<dyn TrackLocal + Send + Sync>> {
        Vec::new()
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

/// Playback registry stub; attach only fires from a live media engine, so
/// the tests only ever observe removals.
#[derive(Default)]
pub struct MockSinkRegistry {
    removed: Mutex<Vec<PeerId>>,
}

impl MockSinkRegistry {
    pub fn removed(&self) -> Vec<PeerId> {
        self.removed.lock().unwrap().clone()
    }
}

impl MediaSinkRegistry for MockSinkRegistry {
    fn attach(&self, _peer_id: &PeerId, _track: Arc<TrackRemote>) {}

    fn remove(&self, peer_id: &PeerId) {
        self.removed.lock().unwrap().push(peer_id.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeEvent {
    Joined(PeerId, String),
    Left(PeerId),
}

#[derive(Default)]
pub struct MockRoomEvents {
    events: Mutex<Vec<BadgeEvent>>,
}

impl MockRoomEvents {
    pub fn events(&self) -> Vec<BadgeEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoomEvents for MockRoomEvents {
    async fn on_peer_joined(&self, peer: PeerId, display_name: String) {
        self.events
            .lock()
            .unwrap()
            .push(BadgeEvent::Joined(peer, display_name));
    }

    async fn on_peer_left(&self, peer: PeerId) {
        self.events.lock().unwrap().push(BadgeEvent::Left(peer));
    }
}

/// An orchestrator running on its own task, with handles on every mock.
pub struct Harness {
    pub local_id: PeerId,
    pub server_tx: mpsc::Sender<ServerMessage>,
    pub command_tx: mpsc::Sender<ClientCommand>,
    pub signals: Arc<MockSignalSink>,
    pub factory: Arc<MockTransportFactory>,
    pub media: Arc<MockLocalMedia>,
    pub sinks: Arc<MockSinkRegistry>,
    pub events: Arc<MockRoomEvents>,
    pub task: tokio::task::JoinHandle<()>,
}

pub fn spawn_orchestrator() -> Harness {
    spawn_orchestrator_with_id(PeerId::new())
}

pub fn spawn_orchestrator_with_id(local_id: PeerId) -> Harness {
    let (server_tx, server_rx) = mpsc::channel(64);
    let (command_tx, command_rx) = mpsc::channel(64);

    let signals = Arc::new(MockSignalSink::default());
    let factory = Arc::new(MockTransportFactory::default());
    let media = Arc::new(MockLocalMedia::default());
    let sinks = Arc::new(MockSinkRegistry::default());
    let events = Arc::new(MockRoomEvents::default());

    let orchestrator = SessionOrchestrator::new(
        local_id.clone(),
        server_rx,
        command_rx,
        signals.clone(),
        factory.clone(),
        sinks.clone(),
        media.clone(),
        events.clone(),
    );
    let task = tokio::spawn(orchestrator.run());

    Harness {
        local_id,
        server_tx,
        command_tx,
        signals,
        factory,
        media,
        sinks,
        events,
        task,
    }
}
