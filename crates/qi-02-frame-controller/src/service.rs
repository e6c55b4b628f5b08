//! # Child Frame Controller
//!
//! Owns one sub-interactive's frame element: decides when to navigate it,
//! owns the channel bound to it and drives the `initInteractive` handshake.
//!
//! ## Reload sequence
//!
//! 1. Disconnect the existing channel (registrations removed first).
//! 2. Record the authored state being handed over, before the child confirms.
//! 3. Point the frame at the desired URL.
//! 4. Create a new channel whose `on_ready` performs the handshake.
//!
//! At most one channel per element exists at any time: step 1 always
//! completes before step 4 starts.
//!
//! ## Locking
//!
//! Every lock is short-lived and released before the controller calls into
//! a channel, a frame element or a port. Children answering synchronously
//! (loopback windows do) re-enter the controller from inside `post`.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use qi_01_channel_transport::{
    ChannelHandle, ChannelState, FrameElement, ListenerRegistration, MessageChannel,
};
use serde_json::{Map, Value};
use shared_types::{
    events, AuthoredConfig, FrameMessage, GetInteractiveState, InitInteractive, RuntimeState,
    SubInteractiveId,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{
    ControllerConfig, DesiredFrame, FlushSlot, PendingFlush, ReloadDecision, ReloadReason,
    RuntimeCell, StateSynchronizer,
};
use crate::error::FrameError;
use crate::handler::router;
use crate::ports::{
    ChildStateObserver, FrameControllerApi, HintSink, LinkedStateRegistry, PlatformSinks,
    SyncOutcome, UpstreamRequests,
};

/// Collaborators a controller reports to.
#[derive(Clone)]
pub struct ControllerPorts {
    pub platform: Arc<dyn PlatformSinks>,
    pub hint_sink: Option<Arc<dyn HintSink>>,
    pub upstream: Option<Arc<dyn UpstreamRequests>>,
    pub linked: Option<Arc<dyn LinkedStateRegistry>>,
    pub observer: Option<Arc<dyn ChildStateObserver>>,
}

impl ControllerPorts {
    /// Ports with only the platform sinks wired.
    pub fn new(platform: Arc<dyn PlatformSinks>) -> Self {
        Self {
            platform,
            hint_sink: None,
            upstream: None,
            linked: None,
            observer: None,
        }
    }

    #[must_use]
    pub fn with_hint_sink(mut self, sink: Arc<dyn HintSink>) -> Self {
        self.hint_sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_upstream(mut self, upstream: Arc<dyn UpstreamRequests>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    #[must_use]
    pub fn with_linked_registry(mut self, linked: Arc<dyn LinkedStateRegistry>) -> Self {
        self.linked = Some(linked);
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ChildStateObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

struct Connection {
    handle: ChannelHandle,
    registrations: Vec<ListenerRegistration>,
}

/// State shared between the controller and the listeners it registers.
///
/// Listeners hold it weakly: a dropped controller silences its channel.
pub(crate) struct ControllerShared {
    pub(crate) id: SubInteractiveId,
    pub(crate) config: ControllerConfig,
    pub(crate) ports: ControllerPorts,
    element: RwLock<Option<Arc<dyn FrameElement>>>,
    desired: RwLock<Option<DesiredFrame>>,
    connection: Mutex<Option<Connection>>,
    sync: Mutex<StateSynchronizer>,
    runtime: RuntimeCell,
    flush: Mutex<FlushSlot>,
    height: Mutex<Option<f64>>,
    hint: Mutex<Option<Value>>,
    connections: AtomicU64,
}

impl ControllerShared {
    fn render(self: &Arc<Self>, desired: DesiredFrame) -> SyncOutcome {
        *self.desired.write() = Some(desired.clone());

        let element = self.element.read().clone();
        let Some(element) = element else {
            debug!(subinteractive_id = %self.id, "Render without frame element");
            return SyncOutcome::Detached;
        };

        let current_src = element.current_src();
        let decision = self.sync.lock().decide(current_src.as_deref(), &desired);
        match decision {
            ReloadDecision::Keep => SyncOutcome::Unchanged,
            ReloadDecision::Reload(reason) => {
                self.reload(&element, &desired, reason);
                SyncOutcome::Reloaded(reason)
            }
        }
    }

    fn reload(self: &Arc<Self>, element: &Arc<dyn FrameElement>, desired: &DesiredFrame, reason: ReloadReason) {
        info!(
            subinteractive_id = %self.id,
            url = %desired.url,
            %reason,
            "Reloading child frame"
        );

        self.disconnect_current();
        self.sync
            .lock()
            .record_handed_authored(desired.authored_state.clone());
        element.set_src(&desired.url);

        let handle = ChannelHandle::with_outbox_capacity(self.config.outbox_capacity);
        *self.connection.lock() = Some(Connection {
            handle: handle.clone(),
            registrations: Vec::new(),
        });
        self.connections.fetch_add(1, Ordering::Relaxed);

        let weak = Arc::downgrade(self);
        let for_handshake = handle.clone();
        let connected = handle.connect(Some(element.as_ref()), move || {
            if let Some(shared) = weak.upgrade() {
                shared.perform_handshake(&for_handshake);
            }
        });
        if let Err(e) = connected {
            // The frame stays blank; the parent keeps showing its loading state.
            debug!(subinteractive_id = %self.id, error = %e, "Channel not connected");
        }
    }

    /// Register the router, then hand the child its configuration.
    fn perform_handshake(self: &Arc<Self>, handle: &ChannelHandle) {
        if !self.is_current(handle) {
            debug!(subinteractive_id = %self.id, channel = handle.id(), "Stale handshake ignored");
            return;
        }

        let registrations = router::wire(self, handle);
        let rejected = {
            let mut connection = self.connection.lock();
            match connection.as_mut() {
                Some(current) if current.handle == *handle => {
                    current.registrations.extend(registrations);
                    None
                }
                _ => Some(registrations),
            }
        };
        if let Some(rejected) = rejected {
            for registration in &rejected {
                handle.remove_listener(registration);
            }
            return;
        }

        let desired = self.desired.read().clone();
        let Some(desired) = desired else {
            return;
        };
        let init = InitInteractive {
            mode: desired.mode,
            authored_state: desired.authored_state,
            interactive_state: self.runtime.get(),
            linked_interactives: desired.linked_interactives,
            extra: Map::new(),
        };
        let posted = FrameMessage::typed(events::INIT_INTERACTIVE, &init)
            .map_err(FrameError::from)
            .and_then(|message| handle.post_message(message).map_err(FrameError::from));
        match posted {
            Ok(()) => debug!(subinteractive_id = %self.id, mode = %init.mode, "Sent initInteractive"),
            Err(e) => warn!(subinteractive_id = %self.id, error = %e, "Handshake post failed"),
        }
    }

    fn is_current(&self, handle: &ChannelHandle) -> bool {
        self.connection
            .lock()
            .as_ref()
            .is_some_and(|c| c.handle == *handle)
    }

    fn current_handle(&self) -> Option<ChannelHandle> {
        self.connection.lock().as_ref().map(|c| c.handle.clone())
    }

    /// Tear down the current channel, if any, and settle a pending flush.
    fn disconnect_current(&self) {
        let connection = self.connection.lock().take();
        if let Some(Connection {
            handle,
            registrations,
        }) = connection
        {
            for registration in &registrations {
                handle.remove_listener(registration);
            }
            handle.disconnect();
            if let Some(linked) = &self.ports.linked {
                linked.remove_all(&self.id);
            }
            if let Some(upstream) = &self.ports.upstream {
                upstream.release(&handle);
            }
            debug!(
                subinteractive_id = %self.id,
                channel = handle.id(),
                listeners = registrations.len(),
                "Child channel disconnected"
            );
        }

        let state = self.runtime.get();
        if self.flush.lock().resolve(state) {
            debug!(subinteractive_id = %self.id, "Pending flush settled with authoritative state");
        }
    }

    fn flush(&self, unloading: bool) -> PendingFlush {
        let handle = self.current_handle().filter(ChannelHandle::is_ready);
        let Some(handle) = handle else {
            return PendingFlush::resolved(self.runtime.get());
        };

        let pending = self.flush.lock().arm();
        let posted = FrameMessage::typed(
            events::GET_INTERACTIVE_STATE,
            &GetInteractiveState { unloading },
        )
        .map_err(FrameError::from)
        .and_then(|message| handle.post_message(message).map_err(FrameError::from));

        if let Err(e) = posted {
            warn!(subinteractive_id = %self.id, error = %e, "Flush request not delivered");
            let state = self.runtime.get();
            self.flush.lock().resolve(state);
        }
        pending
    }

    fn teardown(&self) {
        self.disconnect_current();
        self.element.write().take();
        self.sync.lock().reset();
    }

    // =========================================================================
    // INBOUND EVENTS (called by the router)
    // =========================================================================

    pub(crate) fn on_interactive_state(&self, state: RuntimeState) {
        let next = self.runtime.update(|_previous| state.clone());
        self.sync.lock().observe_runtime(state);

        let resolved = self.flush.lock().resolve(next.clone());
        if resolved {
            debug!(subinteractive_id = %self.id, "Flush resolved by child");
        }

        if let Some(linked) = &self.ports.linked {
            linked.publish(&self.id, &next);
        }
        if let Some(observer) = &self.ports.observer {
            observer.interactive_state_changed(&self.id, &next);
        }
    }

    pub(crate) fn on_authored_state(&self, authored: AuthoredConfig) {
        self.sync.lock().accept_child_authored(authored.clone());
        if let Some(desired) = self.desired.write().as_mut() {
            desired.authored_state = authored.clone();
        }
        if let Some(observer) = &self.ports.observer {
            observer.authored_state_changed(&self.id, &authored);
        }
    }

    pub(crate) fn on_height(&self, height: f64) {
        *self.height.lock() = Some(height);
        let element = self.element.read().clone();
        if let Some(element) = element {
            element.set_height(height);
        }
        if let Some(observer) = &self.ports.observer {
            observer.height_changed(&self.id, height);
        }
    }

    pub(crate) fn on_hint(&self, hint: Value) {
        if let Some(sink) = &self.ports.hint_sink {
            sink.set_hint(&self.id, &hint);
        }
        *self.hint.lock() = Some(hint);
    }

    /// URL of the frame as last rendered.
    pub(crate) fn current_url(&self) -> Option<String> {
        self.desired.read().as_ref().map(|d| d.url.clone())
    }
}

impl Drop for ControllerShared {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.get_mut().take() {
            connection.handle.disconnect();
        }
    }
}

/// Controller of one child frame.
pub struct ChildFrameController {
    shared: Arc<ControllerShared>,
}

impl ChildFrameController {
    /// Create a controller with an empty authoritative state.
    pub fn new(id: SubInteractiveId, config: ControllerConfig, ports: ControllerPorts) -> Self {
        Self::with_state(id, config, ports, Value::Null)
    }

    /// Create a controller seeded with `initial` runtime state.
    pub fn with_state(
        id: SubInteractiveId,
        config: ControllerConfig,
        ports: ControllerPorts,
        initial: RuntimeState,
    ) -> Self {
        Self {
            shared: Arc::new(ControllerShared {
                id,
                config,
                ports,
                element: RwLock::new(None),
                desired: RwLock::new(None),
                connection: Mutex::new(None),
                sync: Mutex::new(StateSynchronizer::new()),
                runtime: RuntimeCell::new(initial),
                flush: Mutex::new(FlushSlot::new()),
                height: Mutex::new(None),
                hint: Mutex::new(None),
                connections: AtomicU64::new(0),
            }),
        }
    }

    /// Stable identity of the controlled sub-interactive.
    #[must_use]
    pub fn id(&self) -> &SubInteractiveId {
        &self.shared.id
    }

    /// Give the controller its frame element and render the last desired frame.
    pub fn attach_element(&self, element: Arc<dyn FrameElement>) -> SyncOutcome {
        *self.shared.element.write() = Some(element);
        let desired = self.shared.desired.read().clone();
        match desired {
            Some(desired) => self.shared.render(desired),
            None => SyncOutcome::Detached,
        }
    }

    /// Whether a frame element is attached.
    #[must_use]
    pub fn has_element(&self) -> bool {
        self.shared.element.read().is_some()
    }

    /// Reconcile the frame against `desired`. Reloads only when the URL or
    /// the authored state (structurally) changed.
    pub fn render(&self, desired: DesiredFrame) -> SyncOutcome {
        self.shared.render(desired)
    }

    /// The frame as last rendered.
    #[must_use]
    pub fn desired(&self) -> Option<DesiredFrame> {
        self.shared.desired.read().clone()
    }

    /// Replace the authoritative runtime state. Never reloads.
    pub fn set_interactive_state(&self, state: RuntimeState) {
        self.shared.runtime.set(state);
    }

    /// Functional update of the authoritative runtime state. Never reloads.
    pub fn update_interactive_state<F>(&self, f: F) -> RuntimeState
    where
        F: FnOnce(&RuntimeState) -> RuntimeState,
    {
        self.shared.runtime.update(f)
    }

    /// Authoritative runtime state.
    #[must_use]
    pub fn interactive_state(&self) -> RuntimeState {
        self.shared.runtime.get()
    }

    /// Runtime state last reported by the current child document.
    #[must_use]
    pub fn last_observed_state(&self) -> Option<RuntimeState> {
        self.shared.sync.lock().last_observed_runtime().cloned()
    }

    /// Ask the child for its current state.
    ///
    /// With a ready channel the request is posted and the returned future
    /// resolves on the child's next `interactiveState`. Otherwise it resolves
    /// at once with the authoritative state.
    pub fn flush(&self, unloading: bool) -> PendingFlush {
        self.shared.flush(unloading)
    }

    /// Whether a flush is waiting for the child.
    #[must_use]
    pub fn has_pending_flush(&self) -> bool {
        self.shared.flush.lock().is_pending()
    }

    /// Disconnect, release the element and forget what the child held.
    /// The authoritative runtime state is kept. Idempotent.
    pub fn teardown(&self) {
        debug!(subinteractive_id = %self.shared.id, "Tearing down child frame controller");
        self.shared.teardown();
    }

    /// Current channel, if one was created.
    #[must_use]
    pub fn channel(&self) -> Option<ChannelHandle> {
        self.shared.current_handle()
    }

    /// State of the current channel.
    #[must_use]
    pub fn channel_state(&self) -> Option<ChannelState> {
        self.shared.current_handle().map(|h| h.state())
    }

    /// Whether a channel exists but the child has not completed the handshake.
    ///
    /// A frame that never loads stays in this state; there is no timeout.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(
            self.channel_state(),
            Some(ChannelState::Unbound | ChannelState::Connecting)
        )
    }

    /// How many channels this controller has created.
    #[must_use]
    pub fn connection_count(&self) -> u64 {
        self.shared.connections.load(Ordering::Relaxed)
    }

    /// Height last requested by the child.
    #[must_use]
    pub fn height(&self) -> Option<f64> {
        *self.shared.height.lock()
    }

    /// Hint last posted by the child.
    #[must_use]
    pub fn hint(&self) -> Option<Value> {
        self.shared.hint.lock().clone()
    }

    /// Post a message to the child over the current channel.
    pub fn post(&self, event: &str, payload: Value) -> Result<(), FrameError> {
        let handle = self
            .shared
            .current_handle()
            .ok_or(qi_01_channel_transport::ChannelError::NotConnected)?;
        handle.post(event, payload)?;
        Ok(())
    }
}

impl std::fmt::Debug for ChildFrameController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildFrameController")
            .field("id", &self.shared.id)
            .field("channel_state", &self.channel_state())
            .field("connections", &self.connection_count())
            .finish()
    }
}

#[async_trait]
impl FrameControllerApi for ChildFrameController {
    fn id(&self) -> &SubInteractiveId {
        ChildFrameController::id(self)
    }

    fn attach_element(&self, element: Arc<dyn FrameElement>) -> SyncOutcome {
        ChildFrameController::attach_element(self, element)
    }

    fn render(&self, desired: DesiredFrame) -> SyncOutcome {
        ChildFrameController::render(self, desired)
    }

    fn set_interactive_state(&self, state: RuntimeState) {
        ChildFrameController::set_interactive_state(self, state);
    }

    fn interactive_state(&self) -> RuntimeState {
        ChildFrameController::interactive_state(self)
    }

    async fn flush_state(&self, unloading: bool) -> Result<RuntimeState, FrameError> {
        self.flush(unloading).await
    }

    fn teardown(&self) {
        ChildFrameController::teardown(self);
    }

    fn channel_state(&self) -> Option<ChannelState> {
        ChildFrameController::channel_state(self)
    }
}
