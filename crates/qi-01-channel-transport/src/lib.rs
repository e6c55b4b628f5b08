//! # QI-01 Channel Transport
//!
//! Binds one cross-document channel to one child frame and exposes a minimal
//! named-event pub/sub surface over it.
//!
//! ## Channel Lifecycle
//!
//! ```text
//!  ┌─────────┐  connect()   ┌────────────┐  handshake   ┌───────┐
//!  │ Unbound │ ───────────→ │ Connecting │ ───────────→ │ Ready │
//!  └─────────┘              └────────────┘              └───────┘
//!       │                         │                         │
//!       └──────── disconnect() ───┴───────── disconnect() ──┘
//!                                 ▼
//!                         ┌──────────────┐
//!                         │ Disconnected │  (terminal)
//!                         └──────────────┘
//! ```
//!
//! A disconnected handle never comes back. Reconnecting means creating a
//! new [`ChannelHandle`].
//!
//! ## Guarantees
//!
//! - `on_ready` runs at most once per handle.
//! - Messages on one handle are delivered in post order; nothing is
//!   guaranteed across handles.
//! - After `disconnect()` no listener runs and queued posts are discarded.
//! - Every listener added to a handle is removed by the time `disconnect()`
//!   returns.

pub mod channel;
pub mod errors;
pub mod listeners;
pub mod loopback;
pub mod request_ids;
pub mod window;

// Re-export main types
pub use channel::{
    ChannelHandle, ChannelState, ChannelStatsSnapshot, MessageChannel, ParentPort,
};
pub use errors::ChannelError;
pub use listeners::{Handler, ListenerRegistration, ListenerRegistry};
pub use loopback::{LoopbackFrame, LoopbackWindow, Responder};
pub use request_ids::{PendingRequest, RequestIdMapper};
pub use window::{ContentWindow, FrameElement};

/// Maximum messages buffered while a channel is still connecting.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 1000;
