//! Ports layer: trait definitions at the controller's seams.

pub mod inbound;
pub mod outbound;

pub use inbound::{FrameControllerApi, SyncOutcome};
pub use outbound::{
    ChildStateObserver, HintSink, LinkedStateRegistry, PlatformSinks, UpstreamRequests,
};
