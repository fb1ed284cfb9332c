use crate::media::{LocalMedia, MediaSinkRegistry};
use crate::transport::{
    CandidateInit, PeerTransport, PeerTransportFactory, TransportConfig, TransportEvent,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use voicemesh_core::PeerId;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// `PeerTransportFactory` backed by the webrtc crate.
pub struct RtcTransportFactory {
    config: TransportConfig,
    media: Arc<dyn LocalMedia>,
    sinks: Arc<dyn MediaSinkRegistry>,
}

impl RtcTransportFactory {
    pub fn new(
        config: TransportConfig,
        media: Arc<dyn LocalMedia>,
        sinks: Arc<dyn MediaSinkRegistry>,
    ) -> Self {
        Self {
            config,
            media,
            sinks,
        }
    }
}

#[async_trait]
impl PeerTransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        remote: PeerId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        let transport = RtcPeerTransport::connect(
            remote,
            self.config.clone(),
            self.media.clone(),
            self.sinks.clone(),
            events,
        )
        .await?;
        Ok(Arc::new(transport))
    }
}

/// One RTCPeerConnection toward one remote peer.
pub struct RtcPeerTransport {
    pub remote: PeerId,
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcPeerTransport {
    pub async fn connect(
        remote: PeerId,
        config: TransportConfig,
        media: Arc<dyn LocalMedia>,
        sinks: Arc<dyn MediaSinkRegistry>,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|s| RTCIceServer {
                    urls: s.urls.clone(),
                    username: s.username.clone().unwrap_or_default(),
                    credential: s.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        // All currently captured tracks, attached once at creation. Mute only
        // flips their enabled flag later, so nothing here ever renegotiates.
        for track in media.tracks() {
            peer_connection
                .add_track(track)
                .await
                .context("failed to attach local track")?;
        }

        let state_tx = event_tx.clone();
        let remote_state = remote.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let remote = remote_state.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {:?}", remote, s);
                    match s {
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => {
                            let _ = tx.send(TransportEvent::Disconnected(remote)).await;
                        }
                        _ => {}
                    }
                })
            },
        ));

        let ice_tx = event_tx.clone();
        let remote_ice = remote.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let remote = remote_ice.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let init = CandidateInit {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                };
                let _ = tx
                    .send(TransportEvent::CandidateDiscovered(remote, init))
                    .await;
            })
        }));

        let remote_track = remote.clone();
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let sinks = sinks.clone();
            let remote = remote_track.clone();

            Box::pin(async move {
                debug!("Inbound track from {}", remote);
                sinks.attach(&remote, track);
            })
        }));

        Ok(Self {
            remote,
            peer_connection,
        })
    }
}

#[async_trait]
impl PeerTransport for RtcPeerTransport {
    async fn create_offer(&self) -> Result<String> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .context("failed to create offer")?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .context("failed to set local description")?;
        Ok(offer.sdp)
    }

    async fn accept_offer(&self, sdp: String) -> Result<String> {
        let desc = RTCSessionDescription::offer(sdp)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .context("failed to set remote offer")?;

        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .context("failed to create answer")?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .context("failed to set local description")?;
        Ok(answer.sdp)
    }

    async fn accept_answer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::answer(sdp)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .context("failed to set remote answer")?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: CandidateInit) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("failed to add ICE candidate")?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
