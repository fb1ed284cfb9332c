use voicemesh_core::IceServerConfig;

#[derive(Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}
