//! # Host Session
//!
//! Runs one composite interactive as the child of its host.
//!
//! ```text
//! host ──initInteractive──────→ session ──sync_authored──→ container ──→ children
//! host ──getInteractiveState──→ session ──flush_all──────→ container ──→ children
//! host ←──interactiveState───── session
//! host ←──log/showModal/...──── HostPlatform ←──────────── children
//! host ←──attachmentUrl/...───→ UpstreamProxy ←──────────→ children
//! ```
//!
//! The container is built on the first `initInteractive` and rebuilt when a
//! later one switches mode. Same-mode re-initialization reuses it, so only
//! children whose URL or authored state changed reload.
//! Host-supplied state seeds a new container; on a reused one it is merged
//! per child, so state the children reported since is kept.

use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use qi_01_channel_transport::{ChannelHandle, ListenerRegistration, MessageChannel};
use qi_02_frame_controller::{PlatformSinks, UpstreamProxy, UpstreamRequests};
use qi_03_composite_container::{
    CompositeAuthoredState, CompositeContainer, CompositeError, CompositeInteractiveState,
    CompositeKind, CompositeObserver, ContainerConfig, ContainerPorts, FrameElementFactory,
    LibraryCatalog, SyncReport,
};
use serde_json::Value;
use shared_types::envelope::decode_payload;
use shared_types::{
    events, parse_state_or_default, GetInteractiveState, InitInteractive, InteractiveMode,
    ProtocolError,
};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::platform::{HostPlatform, HostReporter};
use crate::config::{ConfigError, RuntimeConfig};

/// Host session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No initInteractive received yet")]
    NotInitialized,

    #[error("Malformed authored state: {0}")]
    MalformedAuthoredState(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Composite(#[from] CompositeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What a session needs besides the host link.
#[derive(Clone)]
pub struct SessionPorts {
    pub frames: Arc<dyn FrameElementFactory>,
    pub catalog: LibraryCatalog,
}

impl SessionPorts {
    pub fn new(frames: Arc<dyn FrameElementFactory>) -> Self {
        Self {
            frames,
            catalog: LibraryCatalog::default(),
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: LibraryCatalog) -> Self {
        self.catalog = catalog;
        self
    }
}

struct ActiveComposite {
    mode: InteractiveMode,
    container: Arc<CompositeContainer>,
}

struct SessionInner {
    kind: CompositeKind,
    config: RuntimeConfig,
    link: ChannelHandle,
    ports: SessionPorts,
    platform: Arc<HostPlatform>,
    reporter: Arc<HostReporter>,
    proxy: Arc<UpstreamProxy>,
    active: RwLock<Option<ActiveComposite>>,
    registrations: Mutex<Vec<ListenerRegistration>>,
}

impl SessionInner {
    fn container(&self) -> Option<Arc<CompositeContainer>> {
        self.active.read().as_ref().map(|a| Arc::clone(&a.container))
    }

    fn container_config(&self, mode: InteractiveMode) -> ContainerConfig {
        ContainerConfig::default()
            .with_controller(self.config.controller.clone())
            .with_mode(mode)
    }

    fn build_container(&self, mode: InteractiveMode) -> CompositeContainer {
        let platform: Arc<dyn PlatformSinks> = self.platform.clone();
        let upstream: Arc<dyn UpstreamRequests> = self.proxy.clone();
        let observer: Arc<dyn CompositeObserver> = self.reporter.clone();
        let ports = ContainerPorts::new(platform, Arc::clone(&self.ports.frames))
            .with_upstream(upstream)
            .with_observer(observer)
            .with_catalog(self.ports.catalog.clone());
        CompositeContainer::new(self.kind, self.container_config(mode), ports)
    }

    /// Container for `mode`, replacing one built for another mode.
    ///
    /// The replaced container is torn down before any new child mounts.
    /// The flag is set when the container was built by this call.
    fn container_for(&self, mode: InteractiveMode) -> (Arc<CompositeContainer>, bool) {
        let (container, previous) = {
            let mut active = self.active.write();
            if let Some(current) = active.as_ref() {
                if current.mode == mode {
                    return (Arc::clone(&current.container), false);
                }
            }
            let container = Arc::new(self.build_container(mode));
            let previous = active.replace(ActiveComposite {
                mode,
                container: Arc::clone(&container),
            });
            (container, previous)
        };

        if let Some(previous) = previous {
            info!(from = %previous.mode, to = %mode, "Mode changed, rebuilding composite");
            previous.container.teardown();
        }
        (container, true)
    }

    fn handle_init(&self, payload: &Value) -> Result<SyncReport, SessionError> {
        let init: InitInteractive = decode_payload(events::INIT_INTERACTIVE, payload)?;

        let authored_value = parse_state_or_default(&init.authored_state);
        let authored: CompositeAuthoredState = if authored_value.is_null() {
            CompositeAuthoredState::default()
        } else {
            serde_json::from_value(authored_value)
                .map_err(|e| SessionError::MalformedAuthoredState(e.to_string()))?
        };
        let state = CompositeInteractiveState::from_host(&init.interactive_state);

        // Host state seeds a new composite; afterwards children own theirs.
        let (container, built) = self.container_for(init.mode);
        if built {
            container.set_interactive_state(state);
        } else {
            container.merge_interactive_state(state);
        }
        let report = container.sync_authored(authored.clone())?;

        let stored = container.authored_state();
        if init.mode == InteractiveMode::Authoring && stored != authored {
            debug!("Reporting generated sub-interactive ids");
            self.reporter.authored_state_changed(&stored);
        }

        info!(
            kind = %self.kind,
            mode = %init.mode,
            reloaded = report.reloaded.len(),
            unchanged = report.unchanged.len(),
            "Interactive initialized"
        );
        Ok(report)
    }

    async fn answer_state_request(&self, unloading: bool) -> Result<CompositeInteractiveState, SessionError> {
        let container = self.container().ok_or(SessionError::NotInitialized)?;
        let state = container.flush_all(unloading).await;
        self.reporter.interactive_state_changed(&state);
        debug!(unloading, children = state.subinteractive_states.len(), "State reported to host");
        Ok(state)
    }

    fn on_get_interactive_state(self: &Arc<Self>, payload: &Value) {
        let request: GetInteractiveState =
            decode_payload(events::GET_INTERACTIVE_STATE, payload).unwrap_or_default();

        let inner = Arc::clone(self);
        let mut reply = Box::pin(async move { inner.answer_state_request(request.unloading).await });

        // Loopback children answer during the flush call itself.
        if let Some(result) = (&mut reply).now_or_never() {
            if let Err(e) = result {
                warn!(error = %e, "State request not answered");
            }
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(e) = reply.await {
                        warn!(error = %e, "State request not answered");
                    }
                });
            }
            Err(_) => {
                warn!("No async runtime, answering with the last known state");
                if let Some(container) = self.container() {
                    self.reporter
                        .interactive_state_changed(&container.interactive_state());
                }
            }
        }
    }
}

/// A composite interactive talking to its host.
pub struct HostSession {
    inner: Arc<SessionInner>,
}

impl HostSession {
    /// Session over `link`. The link may still be connecting.
    pub fn new(
        kind: CompositeKind,
        link: ChannelHandle,
        ports: SessionPorts,
        config: RuntimeConfig,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let upstream: Arc<dyn MessageChannel> = Arc::new(link.clone());
        let proxy = UpstreamProxy::with_config(
            upstream,
            config.proxy.request_id_base,
            config.proxy.max_pending_requests,
        );

        Ok(Self {
            inner: Arc::new(SessionInner {
                kind,
                platform: Arc::new(HostPlatform::new(link.clone())),
                reporter: Arc::new(HostReporter::new(link.clone())),
                config,
                link,
                ports,
                proxy,
                active: RwLock::new(None),
                registrations: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Start answering the host. Idempotent.
    pub fn start(&self) {
        let mut registrations = self.inner.registrations.lock();
        if !registrations.is_empty() {
            return;
        }

        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        registrations.push(self.inner.link.add_listener(
            events::INIT_INTERACTIVE,
            Arc::new(move |payload: &Value| {
                if let Some(inner) = weak.upgrade() {
                    if let Err(e) = inner.handle_init(payload) {
                        warn!(error = %e, "initInteractive rejected");
                    }
                }
            }),
        ));

        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        registrations.push(self.inner.link.add_listener(
            events::GET_INTERACTIVE_STATE,
            Arc::new(move |payload: &Value| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_get_interactive_state(payload);
                }
            }),
        ));

        self.inner.proxy.listen();
        info!(kind = %self.inner.kind, "Host session started");
    }

    /// Stop answering the host and tear every child down.
    pub fn stop(&self) {
        let registrations = std::mem::take(&mut *self.inner.registrations.lock());
        for registration in &registrations {
            self.inner.link.remove_listener(registration);
        }
        self.inner.proxy.stop_listening();
        if let Some(container) = self.inner.container() {
            container.teardown();
        }
        info!(kind = %self.inner.kind, "Host session stopped");
    }

    /// Apply one `initInteractive` payload.
    pub fn handle_init(&self, payload: &Value) -> Result<SyncReport, SessionError> {
        self.inner.handle_init(payload)
    }

    /// Flush every child and post the aggregated state to the host.
    pub async fn report_state(&self, unloading: bool) -> Result<CompositeInteractiveState, SessionError> {
        self.inner.answer_state_request(unloading).await
    }

    #[must_use]
    pub fn kind(&self) -> CompositeKind {
        self.inner.kind
    }

    /// Mode of the last `initInteractive`.
    #[must_use]
    pub fn mode(&self) -> Option<InteractiveMode> {
        self.inner.active.read().as_ref().map(|a| a.mode)
    }

    /// The running composite, once initialized.
    #[must_use]
    pub fn container(&self) -> Option<Arc<CompositeContainer>> {
        self.inner.container()
    }

    #[must_use]
    pub fn link(&self) -> &ChannelHandle {
        &self.inner.link
    }

    /// Relayed requests still waiting for the host.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.inner.proxy.pending()
    }
}

impl Drop for HostSession {
    fn drop(&mut self) {
        self.stop();
    }
}
