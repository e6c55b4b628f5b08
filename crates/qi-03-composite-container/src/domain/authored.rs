//! # Composite Authored State
//!
//! The authored configuration of a composite: an ordered list of
//! sub-interactives, each carrying its own opaque authored state.
//!
//! Every sub-interactive has an explicit id, generated once and persisted,
//! so controllers survive reordering.

use crate::domain::kind::CompositeKind;
use crate::error::CompositeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared_types::{AuthoredConfig, SubInteractiveId};
use std::collections::HashSet;

/// One embedded interactive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubInteractive {
    /// Stable id. Empty until [`CompositeAuthoredState::ensure_ids`] runs.
    #[serde(default = "empty_id")]
    pub id: SubInteractiveId,

    /// Library entry the URL is resolved from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_interactive_id: Option<String>,

    /// Literal URL, used when no library entry applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Authored configuration of the child.
    #[serde(default)]
    pub authored_state: AuthoredConfig,

    /// Fields the container does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn empty_id() -> SubInteractiveId {
    SubInteractiveId::new("")
}

impl SubInteractive {
    /// Sub-interactive with a literal URL.
    pub fn with_url(id: impl Into<String>, url: impl Into<String>, authored_state: AuthoredConfig) -> Self {
        Self {
            id: SubInteractiveId::new(id),
            library_interactive_id: None,
            url: Some(url.into()),
            authored_state,
            extra: Map::new(),
        }
    }

    /// Sub-interactive resolved through the library catalog.
    pub fn from_library(
        id: impl Into<String>,
        library_interactive_id: impl Into<String>,
        authored_state: AuthoredConfig,
    ) -> Self {
        Self {
            id: SubInteractiveId::new(id),
            library_interactive_id: Some(library_interactive_id.into()),
            url: None,
            authored_state,
            extra: Map::new(),
        }
    }
}

/// Authored configuration of a composite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeAuthoredState {
    /// Children in display order.
    #[serde(default)]
    pub subinteractives: Vec<SubInteractive>,

    /// Composite-level fields (prompt, title, ...), carried untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompositeAuthoredState {
    /// Authored state holding `subinteractives`.
    pub fn new(subinteractives: Vec<SubInteractive>) -> Self {
        Self {
            subinteractives,
            extra: Map::new(),
        }
    }

    /// Give every sub-interactive without an id a fresh one.
    ///
    /// Returns how many ids were assigned.
    pub fn ensure_ids(&mut self) -> usize {
        let mut assigned = 0;
        for sub in &mut self.subinteractives {
            if sub.id.is_empty() {
                sub.id = SubInteractiveId::generate();
                assigned += 1;
            }
        }
        assigned
    }

    /// Check the list against what `kind` accepts.
    pub fn validate(&self, kind: CompositeKind) -> Result<(), CompositeError> {
        if let Some(max) = kind.max_children() {
            if self.subinteractives.len() > max {
                return Err(CompositeError::TooManySubinteractives {
                    kind,
                    max,
                    count: self.subinteractives.len(),
                });
            }
        }
        let mut seen = HashSet::new();
        for sub in &self.subinteractives {
            if !seen.insert(&sub.id) {
                return Err(CompositeError::DuplicateId(sub.id.clone()));
            }
        }
        Ok(())
    }

    /// Ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<SubInteractiveId> {
        self.subinteractives.iter().map(|s| s.id.clone()).collect()
    }

    /// Look up one sub-interactive.
    #[must_use]
    pub fn find(&self, id: &SubInteractiveId) -> Option<&SubInteractive> {
        self.subinteractives.iter().find(|s| &s.id == id)
    }

    /// Mutable lookup.
    pub fn find_mut(&mut self, id: &SubInteractiveId) -> Option<&mut SubInteractive> {
        self.subinteractives.iter_mut().find(|s| &s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let authored: CompositeAuthoredState = serde_json::from_value(json!({
            "version": 1,
            "prompt": "Answer both",
            "subinteractives": [
                { "id": "a", "libraryInteractiveId": "open-response", "authoredState": { "prompt": "Why?" } },
                { "url": "https://mc.example/", "authoredState": {} }
            ]
        }))
        .unwrap();

        assert_eq!(authored.subinteractives.len(), 2);
        assert_eq!(authored.subinteractives[0].id.as_str(), "a");
        assert!(authored.subinteractives[1].id.is_empty());
        assert_eq!(authored.extra.get("prompt"), Some(&json!("Answer both")));
    }

    #[test]
    fn test_ensure_ids_only_fills_missing() {
        let mut authored = CompositeAuthoredState::new(vec![
            SubInteractive::with_url("keep", "A", json!({})),
            SubInteractive::with_url("", "B", json!({})),
        ]);
        assert_eq!(authored.ensure_ids(), 1);
        assert_eq!(authored.subinteractives[0].id.as_str(), "keep");
        assert!(!authored.subinteractives[1].id.is_empty());
        assert_eq!(authored.ensure_ids(), 0);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let authored = CompositeAuthoredState::new(vec![
            SubInteractive::with_url("x", "A", json!({})),
            SubInteractive::with_url("x", "B", json!({})),
        ]);
        assert_eq!(
            authored.validate(CompositeKind::Carousel),
            Err(CompositeError::DuplicateId(SubInteractiveId::new("x")))
        );
    }

    #[test]
    fn test_side_by_side_limit() {
        let authored = CompositeAuthoredState::new(vec![
            SubInteractive::with_url("a", "A", json!({})),
            SubInteractive::with_url("b", "B", json!({})),
            SubInteractive::with_url("c", "C", json!({})),
        ]);
        assert!(authored.validate(CompositeKind::SideBySide).is_err());
        assert!(authored.validate(CompositeKind::Carousel).is_ok());
    }
}
