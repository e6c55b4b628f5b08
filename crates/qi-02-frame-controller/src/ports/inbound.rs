//! Inbound Ports (Driving Ports)
//!
//! The API a container drives a child frame controller through.

use async_trait::async_trait;
use qi_01_channel_transport::{ChannelState, FrameElement};
use shared_types::{RuntimeState, SubInteractiveId};
use std::sync::Arc;

use crate::domain::DesiredFrame;
use crate::error::FrameError;

/// What a render did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The frame was navigated and a new channel created.
    Reloaded(crate::domain::ReloadReason),
    /// Nothing changed; the existing channel was left alone.
    Unchanged,
    /// No frame element is attached; the desired frame was stored.
    Detached,
}

/// Child frame controller API (Driving Port)
#[async_trait]
pub trait FrameControllerApi: Send + Sync {
    /// Stable identity of the controlled sub-interactive.
    fn id(&self) -> &SubInteractiveId;

    /// Give the controller its frame element.
    fn attach_element(&self, element: Arc<dyn FrameElement>) -> SyncOutcome;

    /// Reconcile against what the parent wants shown.
    fn render(&self, desired: DesiredFrame) -> SyncOutcome;

    /// Replace the authoritative runtime state. Never reloads.
    fn set_interactive_state(&self, state: RuntimeState);

    /// Authoritative runtime state.
    fn interactive_state(&self) -> RuntimeState;

    /// Ask the child for its latest state and wait for it.
    async fn flush_state(&self, unloading: bool) -> Result<RuntimeState, FrameError>;

    /// Disconnect and release everything. Idempotent.
    fn teardown(&self);

    /// State of the current channel, `None` if no channel was ever created.
    fn channel_state(&self) -> Option<ChannelState>;
}
