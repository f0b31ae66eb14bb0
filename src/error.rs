//! Protocol error taxonomy

use crate::protocol::{ClientId, ServerMessage};
use thiserror::Error;

/// Errors reported back to a client over its own connection. All of them are
/// local to one request; none terminates the connection or the server.
#[derive(Error, Debug)]
pub enum SignalingError {
    /// Frame did not parse as a known protocol message
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `join` carried an empty room id
    #[error("roomId is required")]
    MissingRoomId,

    /// Relay target is not a live connection
    #[error("Unknown target: {0}")]
    UnknownTarget(ClientId),
}

impl SignalingError {
    /// Wire representation: every protocol error becomes an `error` frame.
    pub fn into_message(self) -> ServerMessage {
        ServerMessage::Error {
            error: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_become_error_frames() {
        let msg = SignalingError::UnknownTarget(ClientId::from("ghost")).into_message();
        let ServerMessage::Error { error } = msg else {
            panic!("expected an error frame");
        };
        assert_eq!(error, "Unknown target: ghost");
    }
}
