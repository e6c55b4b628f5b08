//! # Channel Handle
//!
//! One live transport bound to one frame element.
//!
//! All locks are released before any callback (`on_ready`, listeners) or any
//! window call runs, so a child replying synchronously from inside
//! `deliver`, or a listener disconnecting its own channel, cannot deadlock.

use crate::errors::ChannelError;
use crate::listeners::{Handler, ListenerRegistration, ListenerRegistry};
use crate::window::{ContentWindow, FrameElement};
use crate::DEFAULT_OUTBOX_CAPACITY;
use parking_lot::{Mutex, RwLock};
use shared_types::FrameMessage;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
    /// Created, not yet bound to a frame.
    Unbound,
    /// Bound, waiting for the child's handshake.
    Connecting,
    /// Handshake complete; messages flow both ways.
    Ready,
    /// Torn down. Terminal.
    Disconnected,
}

/// Named-event pub/sub surface shared by child channels and host links.
pub trait MessageChannel: Send + Sync {
    /// Send one message. Best-effort, ordered per channel, unacknowledged.
    fn post(&self, event: &str, payload: serde_json::Value) -> Result<(), ChannelError>;

    /// Register a handler for inbound messages named `event`.
    fn add_listener(&self, event: &str, handler: Handler) -> ListenerRegistration;

    /// Remove a handler added by `add_listener`. Returns whether it was present.
    fn remove_listener(&self, registration: &ListenerRegistration) -> bool;
}

/// Message counters of one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStatsSnapshot {
    /// Messages handed to the content window.
    pub posted: u64,
    /// Inbound messages dispatched to listeners.
    pub received: u64,
    /// Messages discarded (outbound after disconnect, inbound while not ready).
    pub dropped: u64,
}

type ReadyCallback = Box<dyn FnOnce() + Send>;

struct ChannelInner {
    id: u64,
    state: Mutex<ChannelState>,
    window: Mutex<Option<Arc<dyn ContentWindow>>>,
    on_ready: Mutex<Option<ReadyCallback>>,
    outbox: Mutex<VecDeque<FrameMessage>>,
    outbox_capacity: usize,
    listeners: RwLock<ListenerRegistry>,
    posted: AtomicU64,
    received: AtomicU64,
    dropped: AtomicU64,
}

impl ChannelInner {
    fn state(&self) -> ChannelState {
        *self.state.lock()
    }

    /// Child finished the handshake.
    fn complete_handshake(&self) {
        {
            let mut state = self.state.lock();
            if *state != ChannelState::Connecting {
                debug!(channel = self.id, state = ?*state, "Ignoring late handshake");
                return;
            }
            *state = ChannelState::Ready;
        }
        debug!(channel = self.id, "Channel ready");

        let callback = self.on_ready.lock().take();
        if let Some(callback) = callback {
            callback();
        }

        self.flush_outbox();
    }

    fn flush_outbox(&self) {
        loop {
            if self.state() != ChannelState::Ready {
                break;
            }
            let Some(message) = self.outbox.lock().pop_front() else {
                break;
            };
            self.deliver(message);
        }
    }

    fn deliver(&self, message: FrameMessage) {
        let window = self.window.lock().clone();
        match window {
            Some(window) => {
                self.posted.fetch_add(1, Ordering::Relaxed);
                window.deliver(message);
            }
            None => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Child posted a message.
    fn dispatch(&self, message: FrameMessage) {
        if self.state() != ChannelState::Ready {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(channel = self.id, event = %message.event, "Inbound message dropped (not ready)");
            return;
        }

        let handlers = self.listeners.read().handlers_for(&message.event);
        if handlers.is_empty() {
            debug!(channel = self.id, event = %message.event, "No listener for inbound message");
        }
        self.received.fetch_add(1, Ordering::Relaxed);

        for handler in handlers {
            // A handler may have torn the channel down.
            if self.state() != ChannelState::Ready {
                break;
            }
            handler(&message.payload);
        }
    }

    fn post(&self, message: FrameMessage) -> Result<(), ChannelError> {
        {
            let state = self.state.lock();
            match *state {
                ChannelState::Ready => {}
                ChannelState::Connecting => {
                    let mut outbox = self.outbox.lock();
                    if outbox.len() >= self.outbox_capacity {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        warn!(channel = self.id, event = %message.event, "Outbox full, message dropped");
                        return Err(ChannelError::OutboxFull {
                            capacity: self.outbox_capacity,
                        });
                    }
                    outbox.push_back(message);
                    return Ok(());
                }
                ChannelState::Unbound => return Err(ChannelError::NotConnected),
                ChannelState::Disconnected => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    return Err(ChannelError::Disconnected);
                }
            }
        }
        self.deliver(message);
        Ok(())
    }
}

/// The parent end of a channel, handed to the content window on `connect`.
///
/// Holds only a weak reference: a window outliving its channel simply
/// talks into the void.
#[derive(Clone)]
pub struct ParentPort {
    channel: Weak<ChannelInner>,
}

impl ParentPort {
    /// Signal that the child completed the transport handshake.
    ///
    /// Only the first call after `connect` has any effect.
    pub fn ready(&self) {
        if let Some(inner) = self.channel.upgrade() {
            inner.complete_handshake();
        }
    }

    /// Hand an inbound message from the child to the channel's listeners.
    pub fn receive(&self, message: FrameMessage) {
        if let Some(inner) = self.channel.upgrade() {
            inner.dispatch(message);
        }
    }

    /// Whether the channel behind this port is still connecting or ready.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.channel.upgrade().is_some_and(|inner| {
            matches!(
                inner.state(),
                ChannelState::Connecting | ChannelState::Ready
            )
        })
    }
}

impl fmt::Debug for ParentPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentPort")
            .field("open", &self.is_open())
            .finish()
    }
}

/// Opaque reference to one live transport bound to one frame element.
///
/// Cloning shares the same channel.
#[derive(Clone)]
pub struct ChannelHandle {
    inner: Arc<ChannelInner>,
}

impl ChannelHandle {
    /// Create an unbound handle with the default outbox capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_outbox_capacity(DEFAULT_OUTBOX_CAPACITY)
    }

    /// Create an unbound handle buffering at most `capacity` posts while connecting.
    #[must_use]
    pub fn with_outbox_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                id: NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed),
                state: Mutex::new(ChannelState::Unbound),
                window: Mutex::new(None),
                on_ready: Mutex::new(None),
                outbox: Mutex::new(VecDeque::new()),
                outbox_capacity: capacity,
                listeners: RwLock::new(ListenerRegistry::new()),
                posted: AtomicU64::new(0),
                received: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Process-unique id, for logs.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.inner.state()
    }

    /// Whether the handshake has completed and the channel is live.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state() == ChannelState::Ready
    }

    /// Bind this handle to the content window of `element`.
    ///
    /// `on_ready` runs exactly once, after the child completes the handshake.
    /// With no element (or no content window) nothing happens: the handle
    /// stays unbound and `on_ready` is never called.
    pub fn connect<F>(&self, element: Option<&dyn FrameElement>, on_ready: F) -> Result<(), ChannelError>
    where
        F: FnOnce() + Send + 'static,
    {
        let Some(element) = element else {
            debug!(channel = self.id(), "connect() without frame element");
            return Err(ChannelError::MissingElement);
        };
        let Some(window) = element.content_window() else {
            debug!(channel = self.id(), "connect() on frame without content window");
            return Err(ChannelError::MissingWindow);
        };

        {
            let mut state = self.inner.state.lock();
            if *state != ChannelState::Unbound {
                return Err(ChannelError::AlreadyBound(*state));
            }
            *state = ChannelState::Connecting;
        }
        *self.inner.on_ready.lock() = Some(Box::new(on_ready));
        *self.inner.window.lock() = Some(Arc::clone(&window));

        debug!(channel = self.id(), src = ?element.current_src(), "Channel connecting");
        window.attach(ParentPort {
            channel: Arc::downgrade(&self.inner),
        });
        Ok(())
    }

    /// Tear the channel down. Idempotent.
    ///
    /// Queued posts are discarded, every listener is removed and the window
    /// is detached. No listener runs after this returns.
    pub fn disconnect(&self) {
        let previous = {
            let mut state = self.inner.state.lock();
            let previous = *state;
            if previous == ChannelState::Disconnected {
                return;
            }
            *state = ChannelState::Disconnected;
            previous
        };

        let callback = self.inner.on_ready.lock().take();
        drop(callback);

        let discarded = {
            let mut outbox = self.inner.outbox.lock();
            let count = outbox.len();
            outbox.clear();
            count
        };
        self.inner
            .dropped
            .fetch_add(discarded as u64, Ordering::Relaxed);

        let removed = self.inner.listeners.write().clear();

        let window = self.inner.window.lock().take();
        if let Some(window) = window {
            window.detach();
        }

        debug!(
            channel = self.id(),
            from = ?previous,
            listeners_removed = removed,
            posts_discarded = discarded,
            "Channel disconnected"
        );
    }

    /// Number of listeners currently registered.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Message counters.
    #[must_use]
    pub fn stats(&self) -> ChannelStatsSnapshot {
        ChannelStatsSnapshot {
            posted: self.inner.posted.load(Ordering::Relaxed),
            received: self.inner.received.load(Ordering::Relaxed),
            dropped: self.inner.dropped.load(Ordering::Relaxed),
        }
    }

    /// Whether two handles refer to the same channel.
    #[must_use]
    pub fn same_channel(&self, other: &ChannelHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Post a typed message.
    pub fn post_message(&self, message: FrameMessage) -> Result<(), ChannelError> {
        self.inner.post(message)
    }
}

impl Default for ChannelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ChannelHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_channel(other)
    }
}

impl Eq for ChannelHandle {}

impl fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl MessageChannel for ChannelHandle {
    fn post(&self, event: &str, payload: serde_json::Value) -> Result<(), ChannelError> {
        self.inner.post(FrameMessage::new(event, payload))
    }

    fn add_listener(&self, event: &str, handler: Handler) -> ListenerRegistration {
        let state = self.inner.state.lock();
        if *state == ChannelState::Disconnected {
            debug!(channel = self.id(), event, "Listener added after disconnect is ignored");
            return ListenerRegistration::detached(event);
        }
        self.inner.listeners.write().add(event, handler)
    }

    fn remove_listener(&self, registration: &ListenerRegistration) -> bool {
        self.inner.listeners.write().remove(registration)
    }
}
