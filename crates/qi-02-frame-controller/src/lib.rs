//! # QI-02 Frame Controller
//!
//! Owns one child interactive's frame: decides when it must be reloaded,
//! drives the `initInteractive` handshake, keeps the authoritative runtime
//! state and routes every event the child posts.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): reload decision, state synchronizer,
//!   flush slot, configuration. No I/O.
//! - **Ports Layer** (`ports/`):
//!   - `FrameControllerApi`: driving port
//!   - `PlatformSinks`, `HintSink`, `UpstreamRequests`,
//!     `LinkedStateRegistry`, `ChildStateObserver`: driven ports
//! - **Service Layer** (`service.rs`): `ChildFrameController`
//! - **Handler Layer** (`handler/`): the event router
//! - **Adapters Layer** (`adapters/`): `UpstreamProxy`, `TracingPlatform`,
//!   `RecordingPlatform`
//!
//! ## Invariants
//!
//! - Re-rendering with an unchanged URL and structurally equal authored
//!   state never creates a channel nor sends `initInteractive`.
//! - Runtime state changes never reload.
//! - The old channel is disconnected, with every listener removed, before
//!   a new one is created.
//! - The handshake reads the runtime state current at the time it fires.
//!
//! ## Usage Example
//!
//! ```ignore
//! use qi_02_frame_controller::{
//!     ChildFrameController, ControllerConfig, ControllerPorts, DesiredFrame, TracingPlatform,
//! };
//!
//! let controller = ChildFrameController::new(
//!     "q1".into(),
//!     ControllerConfig::default(),
//!     ControllerPorts::new(Arc::new(TracingPlatform)),
//! );
//! controller.attach_element(frame);
//! controller.render(DesiredFrame::new(url, authored_state));
//!
//! // Before unload
//! let state = controller.flush(true).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod handler;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{RecordingPlatform, TracingPlatform, UpstreamProxy};
pub use domain::{
    should_reload, ControllerConfig, DesiredFrame, FlushSlot, PendingFlush, ReloadDecision,
    ReloadReason, RuntimeCell, StateSynchronizer,
};
pub use error::FrameError;
pub use handler::{merge_log_context, unsupported_modal_message};
pub use ports::{
    ChildStateObserver, FrameControllerApi, HintSink, LinkedStateRegistry, PlatformSinks,
    SyncOutcome, UpstreamRequests,
};
pub use service::{ChildFrameController, ControllerPorts};
