//! Composite kinds and their policies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The supported composite interactives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeKind {
    /// Slides navigated back and forth; every slide stays mounted.
    Carousel,
    /// Hint levels revealed one at a time; only the current level is mounted.
    ScaffoldedQuestion,
    /// Two interactives shown next to each other.
    SideBySide,
}

impl CompositeKind {
    /// Upper bound on sub-interactives, if any.
    #[must_use]
    pub fn max_children(&self) -> Option<usize> {
        match self {
            Self::SideBySide => Some(2),
            Self::Carousel | Self::ScaffoldedQuestion => None,
        }
    }

    /// Whether every child stays mounted, or only the current one.
    #[must_use]
    pub fn mounts_all(&self) -> bool {
        !matches!(self, Self::ScaffoldedQuestion)
    }

    /// Whether the kind tracks a current sub-interactive.
    #[must_use]
    pub fn is_navigable(&self) -> bool {
        !matches!(self, Self::SideBySide)
    }

    /// Wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Carousel => "carousel",
            Self::ScaffoldedQuestion => "scaffolded-question",
            Self::SideBySide => "side-by-side",
        }
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policies() {
        assert!(CompositeKind::Carousel.mounts_all());
        assert!(CompositeKind::SideBySide.mounts_all());
        assert!(!CompositeKind::ScaffoldedQuestion.mounts_all());
        assert_eq!(CompositeKind::SideBySide.max_children(), Some(2));
        assert_eq!(CompositeKind::Carousel.max_children(), None);
        assert!(!CompositeKind::SideBySide.is_navigable());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_value(CompositeKind::ScaffoldedQuestion).unwrap(),
            serde_json::json!("scaffolded-question")
        );
        let kind: CompositeKind = serde_json::from_str("\"side-by-side\"").unwrap();
        assert_eq!(kind, CompositeKind::SideBySide);
    }
}
