//! # Loopback Frames
//!
//! In-process [`FrameElement`] and [`ContentWindow`] used by native hosts,
//! the demo harness and tests. A loopback window plays the child document:
//! it records what the parent posts, can answer through a [`Responder`], and
//! can emit messages of its own.

use crate::channel::ParentPort;
use crate::window::{ContentWindow, FrameElement};
use parking_lot::Mutex;
use shared_types::FrameMessage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Scripted child behaviour: given one message from the parent, the replies
/// the child posts back.
pub type Responder = Arc<dyn Fn(&FrameMessage) -> Vec<FrameMessage> + Send + Sync>;

#[derive(Default)]
struct WindowState {
    port: Option<ParentPort>,
    inbox: Vec<FrameMessage>,
    auto_ready: bool,
    responder: Option<Responder>,
    attach_count: u64,
}

/// In-process content window.
#[derive(Default)]
pub struct LoopbackWindow {
    state: Mutex<WindowState>,
}

impl LoopbackWindow {
    /// A window that waits for [`LoopbackWindow::signal_ready`].
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A window that completes the handshake as soon as it is attached.
    #[must_use]
    pub fn auto_ready() -> Arc<Self> {
        let window = Self::default();
        window.state.lock().auto_ready = true;
        Arc::new(window)
    }

    /// Install scripted replies.
    pub fn set_responder(&self, responder: Responder) {
        self.state.lock().responder = Some(responder);
    }

    /// Complete the handshake on the currently attached port.
    pub fn signal_ready(&self) {
        let port = self.state.lock().port.clone();
        if let Some(port) = port {
            port.ready();
        }
    }

    /// Post a message from the child to the parent.
    pub fn emit(&self, event: &str, payload: serde_json::Value) {
        self.emit_message(FrameMessage::new(event, payload));
    }

    /// Post a prebuilt message from the child to the parent.
    pub fn emit_message(&self, message: FrameMessage) {
        let port = self.state.lock().port.clone();
        match port {
            Some(port) => port.receive(message),
            None => trace!(event = %message.event, "Loopback emit with no parent attached"),
        }
    }

    /// Every message delivered by the parent so far.
    #[must_use]
    pub fn received(&self) -> Vec<FrameMessage> {
        self.state.lock().inbox.clone()
    }

    /// Event names of every delivered message, in order.
    #[must_use]
    pub fn received_events(&self) -> Vec<String> {
        self.state
            .lock()
            .inbox
            .iter()
            .map(|m| m.event.clone())
            .collect()
    }

    /// Delivered messages named `event`.
    #[must_use]
    pub fn received_named(&self, event: &str) -> Vec<FrameMessage> {
        self.state
            .lock()
            .inbox
            .iter()
            .filter(|m| m.event == event)
            .cloned()
            .collect()
    }

    /// How many delivered messages are named `event`.
    #[must_use]
    pub fn count(&self, event: &str) -> usize {
        self.state
            .lock()
            .inbox
            .iter()
            .filter(|m| m.event == event)
            .count()
    }

    /// Forget delivered messages.
    pub fn clear_received(&self) {
        self.state.lock().inbox.clear();
    }

    /// Whether a parent port is currently attached and open.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state
            .lock()
            .port
            .as_ref()
            .is_some_and(ParentPort::is_open)
    }

    /// How many times a parent attached to this window.
    #[must_use]
    pub fn attach_count(&self) -> u64 {
        self.state.lock().attach_count
    }
}

impl ContentWindow for LoopbackWindow {
    fn attach(&self, port: ParentPort) {
        let auto_ready = {
            let mut state = self.state.lock();
            state.port = Some(port.clone());
            state.attach_count += 1;
            state.auto_ready
        };
        if auto_ready {
            port.ready();
        }
    }

    fn deliver(&self, message: FrameMessage) {
        let responder = {
            let mut state = self.state.lock();
            state.inbox.push(message.clone());
            state.responder.clone()
        };
        if let Some(responder) = responder {
            for reply in responder(&message) {
                self.emit_message(reply);
            }
        }
    }

    fn detach(&self) {
        self.state.lock().port = None;
    }
}

/// In-process frame element.
pub struct LoopbackFrame {
    src: Mutex<Option<String>>,
    height: Mutex<Option<f64>>,
    navigations: AtomicU64,
    window: Option<Arc<LoopbackWindow>>,
}

impl LoopbackFrame {
    /// A frame hosting `window`.
    #[must_use]
    pub fn new(window: Arc<LoopbackWindow>) -> Self {
        Self {
            src: Mutex::new(None),
            height: Mutex::new(None),
            navigations: AtomicU64::new(0),
            window: Some(window),
        }
    }

    /// A frame not attached to any document.
    #[must_use]
    pub fn without_window() -> Self {
        Self {
            src: Mutex::new(None),
            height: Mutex::new(None),
            navigations: AtomicU64::new(0),
            window: None,
        }
    }

    /// Last height set by the parent.
    #[must_use]
    pub fn height(&self) -> Option<f64> {
        *self.height.lock()
    }

    /// How many times `set_src` was called.
    #[must_use]
    pub fn navigations(&self) -> u64 {
        self.navigations.load(Ordering::Relaxed)
    }

    /// The window hosted by this frame.
    #[must_use]
    pub fn window(&self) -> Option<Arc<LoopbackWindow>> {
        self.window.clone()
    }
}

impl FrameElement for LoopbackFrame {
    fn current_src(&self) -> Option<String> {
        self.src.lock().clone()
    }

    fn set_src(&self, url: &str) {
        *self.src.lock() = Some(url.to_string());
        self.navigations.fetch_add(1, Ordering::Relaxed);
        if let Some(window) = &self.window {
            window.clear_received();
        }
    }

    fn set_height(&self, height: f64) {
        *self.height.lock() = Some(height);
    }

    fn content_window(&self) -> Option<Arc<dyn ContentWindow>> {
        self.window
            .as_ref()
            .map(|w| Arc::clone(w) as Arc<dyn ContentWindow>)
    }
}
