//! Controller configuration

use qi_01_channel_transport::DEFAULT_OUTBOX_CAPACITY;
use shared_types::ModalKind;

/// Per-controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// How deep this controller's parent is nested below the host (1 = top-level composite).
    pub nesting_level: u32,
    /// Modal kinds answered with a blocking alert instead of being forwarded.
    pub unsupported_modals: Vec<ModalKind>,
    /// Posts buffered per channel while it is connecting.
    pub outbox_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            nesting_level: 1,
            unsupported_modals: vec![ModalKind::Dialog],
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}

impl ControllerConfig {
    /// Whether `kind` may be forwarded to the platform modal API.
    ///
    /// Unknown kinds are never supported.
    #[must_use]
    pub fn supports_modal(&self, kind: ModalKind) -> bool {
        kind != ModalKind::Unknown && !self.unsupported_modals.contains(&kind)
    }

    /// Set the nesting level.
    #[must_use]
    pub fn with_nesting_level(mut self, level: u32) -> Self {
        self.nesting_level = level;
        self
    }

    /// Replace the unsupported modal kinds.
    #[must_use]
    pub fn with_unsupported_modals(mut self, kinds: Vec<ModalKind>) -> Self {
        self.unsupported_modals = kinds;
        self
    }
}
