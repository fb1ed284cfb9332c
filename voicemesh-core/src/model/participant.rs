use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};

/// A connected client as the registry sees it: identity plus display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: PeerId,
    pub display_name: String,
}

impl Participant {
    pub fn new(id: PeerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Build a participant, deriving a `User-xxxx` placeholder when the
    /// supplied name is empty or whitespace.
    pub fn with_fallback_name(id: PeerId, raw_name: &str) -> Self {
        let trimmed = raw_name.trim();
        let display_name = if trimmed.is_empty() {
            format!("User-{}", id.short())
        } else {
            trimmed.to_string()
        };
        Self { id, display_name }
    }
}
