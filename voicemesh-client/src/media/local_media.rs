use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

/// Contract for the capture subsystem. Mute and push-to-talk only flip the
/// enabled flag; the tracks themselves stay attached to every peer session
/// for their whole lifetime, so toggling never triggers renegotiation.
pub trait LocalMedia: Send + Sync {
    /// Currently captured local tracks, attached to each new peer session.
    fn tracks(&self) -> Vec<Arc<dyn TrackLocal + Send + Sync>>;

    fn set_enabled(&self, enabled: bool);

    fn enabled(&self) -> bool;
}
