//! Aggregated runtime state of a composite.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{parse_state, RuntimeState, SubInteractiveId};
use std::collections::BTreeMap;
use tracing::debug;

/// Runtime state of every child, plus the navigation position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeInteractiveState {
    /// Latest authoritative state per child.
    #[serde(default)]
    pub subinteractive_states: BTreeMap<SubInteractiveId, RuntimeState>,

    /// Child currently shown (carousel, scaffolded question).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_subinteractive_id: Option<SubInteractiveId>,
}

impl CompositeInteractiveState {
    /// Tolerant decode of host-supplied state.
    ///
    /// Missing, unparseable or mis-shaped state yields the empty state.
    pub fn from_host(raw: &Value) -> Self {
        let Some(value) = parse_state(raw) else {
            return Self::default();
        };
        serde_json::from_value(value).unwrap_or_else(|e| {
            debug!(error = %e, "Discarding mis-shaped composite state");
            Self::default()
        })
    }

    /// State of one child, `Null` if none.
    #[must_use]
    pub fn state_of(&self, id: &SubInteractiveId) -> RuntimeState {
        self.subinteractive_states
            .get(id)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Record the state of one child. `Null` removes the entry.
    pub fn record(&mut self, id: &SubInteractiveId, state: RuntimeState) {
        if state.is_null() {
            self.subinteractive_states.remove(id);
        } else {
            self.subinteractive_states.insert(id.clone(), state);
        }
    }

    /// Drop entries for children not in `ids`.
    pub fn retain(&mut self, ids: &[SubInteractiveId]) {
        self.subinteractive_states.retain(|id, _| ids.contains(id));
        if let Some(current) = &self.current_subinteractive_id {
            if !ids.contains(current) {
                self.current_subinteractive_id = None;
            }
        }
    }

    /// Serialize for the host.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
