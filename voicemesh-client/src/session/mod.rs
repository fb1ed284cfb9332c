mod orchestrator;
mod peer_session;
mod room_events;
mod session_command;

pub use orchestrator::*;
pub use peer_session::*;
pub use room_events::*;
pub use session_command::*;
