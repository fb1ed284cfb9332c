use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque per-connection participant identity, assigned by the relay.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct PeerId(pub Uuid);

#[derive(Debug, thiserror::Error)]
#[error("invalid peer id: {0}")]
pub struct PeerIdError(#[from] uuid::Error);

impl PeerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First four characters of the textual id, used for derived display names.
    pub fn short(&self) -> String {
        self.0.to_string().chars().take(4).collect()
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for PeerId {
    type Err = PeerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
