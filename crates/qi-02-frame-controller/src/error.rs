//! Error types for the frame controller

use qi_01_channel_transport::ChannelError;
use shared_types::ProtocolError;
use thiserror::Error;

/// Errors surfaced by a child frame controller.
///
/// None of these cross the frame boundary: router handlers log and absorb
/// them. They reach callers only through `flush` results and proxy relays.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A newer flush request replaced this one before the child answered.
    #[error("Flush superseded by a newer request")]
    FlushSuperseded,

    /// The controller was dropped while the flush was pending.
    #[error("Flush abandoned: controller dropped")]
    FlushAbandoned,

    /// No upstream link is configured for proxied requests.
    #[error("No upstream host link for {event}")]
    UpstreamUnavailable { event: String },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}
