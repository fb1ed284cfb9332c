pub mod media;
pub mod session;
pub mod signaling;
pub mod transport;

pub use media::{LocalMedia, MediaSinkRegistry};
pub use session::{
    ClientCommand, NegotiationRole, PeerSession, RoomEvents, SessionOrchestrator, SessionState,
};
pub use signaling::SignalSink;
pub use transport::{
    CandidateInit, PeerTransport, PeerTransportFactory, RtcPeerTransport, RtcTransportFactory,
    TransportConfig, TransportEvent,
};
