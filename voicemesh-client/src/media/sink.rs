use std::sync::Arc;
use voicemesh_core::PeerId;
use webrtc::track::track_remote::TrackRemote;

/// Contract for the playback side. One sink per remote identity, created
/// lazily on the first inbound track and reused if more tracks arrive;
/// `remove` must release the sink synchronously.
pub trait MediaSinkRegistry: Send + Sync {
    fn attach(&self, peer_id: &PeerId, track: Arc<TrackRemote>);

    fn remove(&self, peer_id: &PeerId);
}
