//! # QI-03 Composite Container
//!
//! Composite interactives embed several child interactives and present
//! them as one to the host:
//!
//! - **carousel**: every child mounted, one shown at a time
//! - **scaffolded question**: one level mounted, revealed forward only
//! - **side-by-side**: two children, able to read each other's state
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): composite kinds, authored and
//!   aggregated state, navigation, library catalog
//! - **Ports Layer** (`ports.rs`): `FrameElementFactory`, `CompositeObserver`
//! - **Service Layer** (`service.rs`): `CompositeContainer`
//! - **Adapters Layer** (`adapters/`): `LinkedStateHub`,
//!   `LoopbackFrameFactory`, `RecordingCompositeObserver`
//!
//! Each child gets its own [`qi_02_frame_controller::ChildFrameController`],
//! keyed by the child's persisted id. Reordering children therefore never
//! reloads any of them.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{LinkedStateHub, LoopbackFrameFactory, RecordingCompositeObserver};
pub use domain::{
    current_or_first, next_id, previous_id, CompositeAuthoredState, CompositeInteractiveState,
    CompositeKind, LibraryCatalog, SubInteractive,
};
pub use error::CompositeError;
pub use ports::{CompositeObserver, FrameElementFactory};
pub use service::{CompositeContainer, ContainerConfig, ContainerPorts, SyncReport};
