//! Ports of the composite container.

use crate::domain::{CompositeAuthoredState, CompositeInteractiveState};
use qi_01_channel_transport::FrameElement;
use shared_types::SubInteractiveId;
use std::sync::Arc;

/// Creates the frame element a child is mounted in.
pub trait FrameElementFactory: Send + Sync {
    /// A fresh element for `subinteractive`.
    fn create(&self, subinteractive: &SubInteractiveId) -> Arc<dyn FrameElement>;

    /// The element of `subinteractive` was unmounted.
    fn release(&self, _subinteractive: &SubInteractiveId) {}
}

/// Upward reporting of a composite's state (to the host session).
pub trait CompositeObserver: Send + Sync {
    /// Aggregated runtime state changed.
    fn interactive_state_changed(&self, state: &CompositeInteractiveState);

    /// Composite authored state changed because a child reported its own.
    fn authored_state_changed(&self, authored: &CompositeAuthoredState);
}
