pub mod model;

pub use model::{
    ClientMessage, IceServerConfig, Participant, PeerId, PeerIdError, ServerMessage,
    SignalPayload,
};
