//! Adapters layer.

pub mod frames;
pub mod linked_state;
pub mod observer;

pub use frames::LoopbackFrameFactory;
pub use linked_state::LinkedStateHub;
pub use observer::RecordingCompositeObserver;
