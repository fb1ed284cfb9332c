use async_trait::async_trait;
use voicemesh_core::PeerId;

/// Room-level notifications for the presentation layer (participant badges).
/// Purely informational: implementations must not drive session state.
#[async_trait]
pub trait RoomEvents: Send + Sync {
    async fn on_peer_joined(&self, peer: PeerId, display_name: String);

    async fn on_peer_left(&self, peer: PeerId);
}
