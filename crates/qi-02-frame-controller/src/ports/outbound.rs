//! Outbound Ports (Driven Ports)
//!
//! What a controller needs from the parent it lives in: platform sinks,
//! an optional hint slot, the upstream link for proxied requests, the
//! sibling-state registry and an observer for upward reporting.

use crate::error::FrameError;
use qi_01_channel_transport::ChannelHandle;
use serde_json::Value;
use shared_types::{
    AddLinkedInteractiveStateListener, AuthoredConfig, ProxiedKind, ProxiedMessage, RequestId,
    RuntimeState, ShowModalRequest, SubInteractiveId,
};

/// Logging and modal APIs of the platform.
pub trait PlatformSinks: Send + Sync {
    /// Record a log event.
    fn log(&self, action: &str, data: &Value);

    /// Open a modal.
    fn show_modal(&self, request: &ShowModalRequest);

    /// Close a modal.
    fn close_modal(&self, options: &Value);

    /// Blocking user-facing alert.
    fn alert(&self, message: &str);
}

/// External hint slot. Without one, hints stay inside the controller.
pub trait HintSink: Send + Sync {
    fn set_hint(&self, subinteractive: &SubInteractiveId, hint: &Value);
}

/// Relays child requests one level up and routes the responses back.
pub trait UpstreamRequests: Send + Sync {
    /// Relay `request` of `kind` on behalf of the child behind `child`.
    ///
    /// Returns the id used on the upstream leg.
    fn relay(
        &self,
        kind: ProxiedKind,
        request: ProxiedMessage,
        child: ChannelHandle,
    ) -> Result<RequestId, FrameError>;

    /// Forget requests routed to `child` (it disconnected).
    fn release(&self, child: &ChannelHandle) -> usize;
}

/// Cross-sibling state subscriptions (side-by-side).
pub trait LinkedStateRegistry: Send + Sync {
    /// `subscriber` wants pushes of another sibling's state over `channel`.
    fn add_listener(
        &self,
        subscriber: &SubInteractiveId,
        request: AddLinkedInteractiveStateListener,
        channel: ChannelHandle,
    );

    /// Remove one subscription of `subscriber`.
    fn remove_listener(&self, subscriber: &SubInteractiveId, listener_id: &str) -> bool;

    /// Remove every subscription of `subscriber`. Returns how many were removed.
    fn remove_all(&self, subscriber: &SubInteractiveId) -> usize;

    /// `source` has new state to push to its subscribers.
    fn publish(&self, source: &SubInteractiveId, state: &RuntimeState);
}

/// Upward notifications from a controller to its container.
pub trait ChildStateObserver: Send + Sync {
    /// The child's authoritative runtime state changed.
    fn interactive_state_changed(&self, subinteractive: &SubInteractiveId, state: &RuntimeState);

    /// The child reported a new authored configuration (authoring mode).
    fn authored_state_changed(&self, subinteractive: &SubInteractiveId, authored: &AuthoredConfig);

    /// The child asked for a new height.
    fn height_changed(&self, _subinteractive: &SubInteractiveId, _height: f64) {}
}
