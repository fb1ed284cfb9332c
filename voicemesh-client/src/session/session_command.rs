/// Local control inputs to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    /// Persistent mute toggle.
    SetMuted(bool),
    /// Push-to-talk key held / released; forces the mic on while held.
    SetPushToTalk(bool),
    /// Leave the room: tear down every peer session and stop.
    Leave,
}
