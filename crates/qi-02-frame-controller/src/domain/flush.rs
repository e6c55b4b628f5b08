//! # Flush Slot
//!
//! At most one flush ("send me your current state before I unload") is
//! outstanding per controller. Arming a second one supersedes the first.

use crate::error::FrameError;
use shared_types::RuntimeState;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::warn;

type FlushResult = Result<RuntimeState, FrameError>;

/// Future resolving to the child's flushed state.
#[derive(Debug)]
pub struct PendingFlush {
    rx: oneshot::Receiver<FlushResult>,
}

impl PendingFlush {
    /// A flush that is already resolved with `state`.
    #[must_use]
    pub fn resolved(state: RuntimeState) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Ok(state));
        Self { rx }
    }

    /// Result if already available, without waiting.
    pub fn try_result(&mut self) -> Option<FlushResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(FrameError::FlushAbandoned)),
        }
    }
}

impl Future for PendingFlush {
    type Output = FlushResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(FrameError::FlushAbandoned)))
    }
}

/// The single outstanding flush resolver of a controller.
#[derive(Debug, Default)]
pub struct FlushSlot {
    pending: Option<oneshot::Sender<FlushResult>>,
}

impl FlushSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a new flush. A flush already pending resolves `FlushSuperseded`.
    pub fn arm(&mut self) -> PendingFlush {
        let (tx, rx) = oneshot::channel();
        if let Some(previous) = self.pending.replace(tx) {
            warn!("Flush requested while another is pending; superseding it");
            let _ = previous.send(Err(FrameError::FlushSuperseded));
        }
        PendingFlush { rx }
    }

    /// Resolve the pending flush, if any. Returns whether one was pending.
    pub fn resolve(&mut self, state: RuntimeState) -> bool {
        match self.pending.take() {
            Some(tx) => {
                let _ = tx.send(Ok(state));
                true
            }
            None => false,
        }
    }

    /// Whether a flush is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_resolve_pending() {
        let mut slot = FlushSlot::new();
        let pending = slot.arm();
        assert!(slot.is_pending());
        assert!(slot.resolve(json!({ "y": 5 })));
        assert_eq!(pending.await, Ok(json!({ "y": 5 })));
        assert!(!slot.is_pending());
    }

    #[tokio::test]
    async fn test_second_arm_supersedes_first() {
        let mut slot = FlushSlot::new();
        let first = slot.arm();
        let second = slot.arm();
        slot.resolve(json!(1));
        assert_eq!(first.await, Err(FrameError::FlushSuperseded));
        assert_eq!(second.await, Ok(json!(1)));
    }

    #[test]
    fn test_resolve_without_pending() {
        let mut slot = FlushSlot::new();
        assert!(!slot.resolve(json!(null)));
    }

    #[test]
    fn test_dropped_slot_abandons() {
        let mut slot = FlushSlot::new();
        let mut pending = slot.arm();
        assert_eq!(pending.try_result(), None);
        drop(slot);
        assert_eq!(pending.try_result(), Some(Err(FrameError::FlushAbandoned)));
    }

    #[test]
    fn test_resolved_is_ready() {
        let mut pending = PendingFlush::resolved(json!({ "a": 1 }));
        assert_eq!(pending.try_result(), Some(Ok(json!({ "a": 1 }))));
    }
}
