use dashmap::DashMap;
use tracing::info;
use voicemesh_core::{Participant, PeerId};

/// What a departing peer leaves behind: the room it was in and the members
/// that should be told about it.
#[derive(Debug)]
pub struct Departure {
    pub room: String,
    pub remaining: Vec<PeerId>,
}

/// Result of a join: the members that were already in the room (join order,
/// excluding the joiner) plus a departure from a previous room, if the peer
/// was registered elsewhere.
#[derive(Debug)]
pub struct JoinOutcome {
    pub peers: Vec<Participant>,
    pub displaced: Option<Departure>,
}

/// Per-room membership bookkeeping. Message relay never touches this; only
/// join and leave mutate it, each room's member list under a single map guard.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Vec<Participant>>,
    memberships: DashMap<PeerId, String>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant in a room, creating the room if absent.
    /// A peer belongs to at most one room: joining while registered elsewhere
    /// removes it there first. Re-joining the same room refreshes the entry.
    pub fn join(&self, room: &str, participant: Participant) -> JoinOutcome {
        let peer = participant.id.clone();

        let previous = self.memberships.insert(peer.clone(), room.to_string());
        let displaced = match previous {
            Some(prev) if prev != room => self.remove_member(&prev, &peer),
            _ => None,
        };

        let peers = {
            let mut members = self.rooms.entry(room.to_string()).or_default();
            let peers: Vec<Participant> =
                members.iter().filter(|p| p.id != peer).cloned().collect();
            members.retain(|p| p.id != peer);
            members.push(participant);
            peers
        };

        info!("Peer {} joined room '{}' ({} existing)", peer, room, peers.len());
        JoinOutcome { peers, displaced }
    }

    /// Remove a peer from whatever room it is in. Idempotent: leaving twice or
    /// without having joined returns `None`.
    pub fn leave(&self, peer: &PeerId) -> Option<Departure> {
        let (_, room) = self.memberships.remove(peer)?;
        let departure = self.remove_member(&room, peer);
        if departure.is_some() {
            info!("Peer {} left room '{}'", peer, room);
        }
        departure
    }

    /// Current members of a room, in join order.
    pub fn members(&self, room: &str) -> Vec<Participant> {
        self.rooms.get(room).map(|m| m.clone()).unwrap_or_default()
    }

    fn remove_member(&self, room: &str, peer: &PeerId) -> Option<Departure> {
        let departure = {
            let mut members = self.rooms.get_mut(room)?;
            let before = members.len();
            members.retain(|p| &p.id != peer);
            if members.len() == before {
                return None;
            }
            Departure {
                room: room.to_string(),
                remaining: members.iter().map(|p| p.id.clone()).collect(),
            }
        };

        self.rooms.remove_if(room, |_, members| members.is_empty());
        Some(departure)
    }
}
