//! Error types for the channel transport.

use crate::channel::ChannelState;
use thiserror::Error;

/// Errors from channel operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// No frame element to bind to.
    #[error("No frame element to connect to")]
    MissingElement,

    /// The frame element has no content window (not attached to a document).
    #[error("Frame element has no content window")]
    MissingWindow,

    /// `connect()` was called on a handle that is not unbound.
    #[error("Channel already bound (state: {0:?})")]
    AlreadyBound(ChannelState),

    /// Posting on a handle that was never connected.
    #[error("Channel not connected")]
    NotConnected,

    /// Posting on a handle after `disconnect()`.
    #[error("Channel disconnected")]
    Disconnected,

    /// Too many messages buffered while connecting.
    #[error("Outbox full: {capacity} messages queued")]
    OutboxFull { capacity: usize },
}
