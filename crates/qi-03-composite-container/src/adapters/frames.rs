//! Loopback frame factory: mounts every child in an in-process window.

use parking_lot::RwLock;
use qi_01_channel_transport::{FrameElement, LoopbackFrame, LoopbackWindow, Responder};
use shared_types::SubInteractiveId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::ports::FrameElementFactory;

/// Creates [`LoopbackFrame`]s and keeps the windows reachable by child id.
pub struct LoopbackFrameFactory {
    auto_ready: bool,
    responder: Option<Responder>,
    frames: RwLock<HashMap<SubInteractiveId, Arc<LoopbackFrame>>>,
    created: AtomicU64,
}

impl LoopbackFrameFactory {
    /// Factory whose windows complete the handshake on attach.
    #[must_use]
    pub fn auto_ready() -> Self {
        Self {
            auto_ready: true,
            responder: None,
            frames: RwLock::new(HashMap::new()),
            created: AtomicU64::new(0),
        }
    }

    /// Factory whose windows wait for an explicit `signal_ready`.
    #[must_use]
    pub fn manual() -> Self {
        Self {
            auto_ready: false,
            ..Self::auto_ready()
        }
    }

    /// Install the same scripted child on every window created from now on.
    #[must_use]
    pub fn with_responder(mut self, responder: Responder) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Frame currently mounted for `id`.
    #[must_use]
    pub fn frame(&self, id: &SubInteractiveId) -> Option<Arc<LoopbackFrame>> {
        self.frames.read().get(id).cloned()
    }

    /// Window currently mounted for `id`.
    #[must_use]
    pub fn window(&self, id: &SubInteractiveId) -> Option<Arc<LoopbackWindow>> {
        self.frame(id).and_then(|f| f.window())
    }

    /// Ids with a mounted frame.
    #[must_use]
    pub fn mounted(&self) -> Vec<SubInteractiveId> {
        let mut ids: Vec<_> = self.frames.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of frames ever created.
    #[must_use]
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}

impl FrameElementFactory for LoopbackFrameFactory {
    fn create(&self, subinteractive: &SubInteractiveId) -> Arc<dyn FrameElement> {
        let window = if self.auto_ready {
            LoopbackWindow::auto_ready()
        } else {
            LoopbackWindow::new()
        };
        if let Some(responder) = &self.responder {
            window.set_responder(Arc::clone(responder));
        }
        let frame = Arc::new(LoopbackFrame::new(window));
        self.frames
            .write()
            .insert(subinteractive.clone(), Arc::clone(&frame));
        self.created.fetch_add(1, Ordering::Relaxed);
        frame
    }

    fn release(&self, subinteractive: &SubInteractiveId) {
        self.frames.write().remove(subinteractive);
    }
}
