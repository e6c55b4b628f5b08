//! Error types for composite containers

use crate::domain::CompositeKind;
use shared_types::SubInteractiveId;
use thiserror::Error;

/// Errors from composite container operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositeError {
    #[error("{kind} accepts at most {max} sub-interactives, got {count}")]
    TooManySubinteractives {
        kind: CompositeKind,
        max: usize,
        count: usize,
    },

    #[error("Duplicate sub-interactive id: {0}")]
    DuplicateId(SubInteractiveId),

    #[error("Unknown sub-interactive: {0}")]
    UnknownSubinteractive(SubInteractiveId),

    #[error("{0} does not support this navigation")]
    NavigationUnsupported(CompositeKind),

    #[error("No sub-interactives to navigate")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_message() {
        let err = CompositeError::TooManySubinteractives {
            kind: CompositeKind::SideBySide,
            max: 2,
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "side-by-side accepts at most 2 sub-interactives, got 3"
        );
    }
}
