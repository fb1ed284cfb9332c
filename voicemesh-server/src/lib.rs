mod room;
mod signaling;

pub use room::{Departure, JoinOutcome, RoomRegistry};
pub use signaling::{AppState, SignalingService, ws_handler};
