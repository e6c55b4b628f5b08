//! # Tolerant State Parsing
//!
//! Hosts sometimes hand state over as a JSON-encoded string instead of a
//! JSON value. A string that fails to parse is treated as "no state".

use serde_json::Value;
use tracing::debug;

/// Normalize a host-supplied state value.
///
/// - `Null` → `None`
/// - a string holding JSON → the parsed value (`None` if it parses to `null`)
/// - a string that is not JSON → `None`
/// - anything else → itself
pub fn parse_state(raw: &Value) -> Option<Value> {
    match raw {
        Value::Null => None,
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Null) => None,
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(error = %e, "Discarding unparseable state string");
                None
            }
        },
        other => Some(other.clone()),
    }
}

/// Like [`parse_state`] but yields `Null` for missing state.
pub fn parse_state_or_default(raw: &Value) -> Value {
    parse_state(raw).unwrap_or(Value::Null)
}
