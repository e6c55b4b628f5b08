//! # `FrameMessage` Envelope
//!
//! The unit carried across a frame boundary: a named event with a JSON
//! payload. Every channel, in both directions, moves only `FrameMessage`s.

use crate::errors::ProtocolError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One named message posted across a frame boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMessage {
    /// Event name, e.g. `initInteractive`.
    #[serde(rename = "type")]
    pub event: String,

    /// JSON payload. `Null` when the event carries no data.
    #[serde(rename = "content", default)]
    pub payload: serde_json::Value,
}

impl FrameMessage {
    /// Build a message from an event name and a raw payload.
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }

    /// Build a message from an event name and a typed payload.
    pub fn typed<T: Serialize>(event: &str, payload: &T) -> Result<Self, ProtocolError> {
        let payload =
            serde_json::to_value(payload).map_err(|e| ProtocolError::MalformedPayload {
                event: event.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(event, payload))
    }

    /// Decode the payload into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        decode_payload(&self.event, &self.payload)
    }
}

/// Decode a raw payload for `event` into a typed value.
pub fn decode_payload<T: DeserializeOwned>(
    event: &str,
    payload: &serde_json::Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(payload.clone()).map_err(|e| ProtocolError::MalformedPayload {
        event: event.to_string(),
        reason: e.to_string(),
    })
}
