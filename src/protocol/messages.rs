//! Client-server message protocol

use super::ids::{ClientId, RoomId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Part a connection plays in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Broadcaster,
}

/// Room member as listed in the `joined` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ClientId,
    pub role: Role,
}

/// Client → server messages.
///
/// SDP and ICE payloads are opaque: the server forwards them verbatim and
/// never inspects their contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    // Room membership
    #[serde(rename_all = "camelCase")]
    Join { room_id: String, role: Role },
    Leave,

    // WebRTC signaling
    #[serde(rename_all = "camelCase")]
    Offer { target_id: String, offer: Value },
    #[serde(rename_all = "camelCase")]
    Answer { target_id: String, answer: Value },
    #[serde(rename_all = "camelCase")]
    IceCandidate { target_id: String, candidate: Value },
}

/// Server → client messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    // Connection
    #[serde(rename_all = "camelCase")]
    Welcome { client_id: ClientId },
    Error { error: String },

    // Room events
    #[serde(rename_all = "camelCase")]
    Joined {
        room_id: RoomId,
        role: Role,
        participants: Vec<Participant>,
    },
    #[serde(rename_all = "camelCase")]
    PeerJoined { peer_id: ClientId, role: Role },
    #[serde(rename_all = "camelCase")]
    PeerLeft { peer_id: ClientId },

    // WebRTC signaling, forwarded with the sender attached
    #[serde(rename_all = "camelCase")]
    Offer { from_id: ClientId, offer: Value },
    #[serde(rename_all = "camelCase")]
    Answer { from_id: ClientId, answer: Value },
    #[serde(rename_all = "camelCase")]
    IceCandidate { from_id: ClientId, candidate: Value },
}
