use async_trait::async_trait;
use voicemesh_core::ClientMessage;

/// Outbound path to the relay, implemented by whatever owns the server
/// connection (a WebSocket writer in production, a recorder in tests).
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn send(&self, msg: ClientMessage);
}
