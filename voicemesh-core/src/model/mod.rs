mod participant;
mod peer;
mod signaling;

pub use participant::Participant;
pub use peer::{PeerId, PeerIdError};
pub use signaling::{ClientMessage, IceServerConfig, ServerMessage, SignalPayload};
