//! # Error Types
//!
//! Errors raised while encoding or decoding protocol messages.

use thiserror::Error;

/// Errors related to protocol payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The payload of an event does not have the expected shape.
    #[error("Malformed payload for {event}: {reason}")]
    MalformedPayload { event: String, reason: String },

    /// An event name this runtime does not handle.
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_payload_message() {
        let err = ProtocolError::MalformedPayload {
            event: "height".to_string(),
            reason: "expected number".to_string(),
        };
        assert!(err.to_string().contains("height"));
        assert!(err.to_string().contains("expected number"));
    }
}
