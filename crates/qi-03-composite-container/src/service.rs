//! # Composite Container
//!
//! Owns one [`ChildFrameController`] per sub-interactive, keyed by the
//! sub-interactive's explicit id, and aggregates their runtime states.
//!
//! ## Render policy
//!
//! | kind | mounted children |
//! |---|---|
//! | carousel | all |
//! | side-by-side | all (at most two) |
//! | scaffolded question | the current one only |
//!
//! Unmounted children keep their authoritative state; remounting one
//! hands it back in the handshake.
//!
//! ## Locking
//!
//! Controllers, aggregated state and authored state sit behind separate
//! locks. None is held while a controller runs, because a child answering
//! synchronously reports back into the container from inside `render`.

use futures::future::join_all;
use parking_lot::RwLock;
use qi_02_frame_controller::{
    ChildFrameController, ChildStateObserver, ControllerConfig, ControllerPorts, DesiredFrame,
    LinkedStateRegistry, PlatformSinks, SyncOutcome, UpstreamRequests,
};
use shared_types::{AuthoredConfig, InteractiveMode, RuntimeState, SubInteractiveId};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use crate::adapters::LinkedStateHub;
use crate::domain::{
    current_or_first, next_id, previous_id, CompositeAuthoredState, CompositeInteractiveState,
    CompositeKind, LibraryCatalog,
};
use crate::error::CompositeError;
use crate::ports::{CompositeObserver, FrameElementFactory};

/// Settings of a composite container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Mode every child is initialized in.
    pub mode: InteractiveMode,
    /// Settings handed to every child controller.
    pub controller: ControllerConfig,
}

impl Default for ContainerConfig {
    /// Runtime mode, default controller settings.
    fn default() -> Self {
        Self {
            mode: InteractiveMode::Runtime,
            controller: ControllerConfig::default(),
        }
    }
}

impl ContainerConfig {
    /// Replace the settings handed to child controllers.
    #[must_use]
    pub fn with_controller(mut self, controller: ControllerConfig) -> Self {
        self.controller = controller;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: InteractiveMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_nesting_level(mut self, level: u32) -> Self {
        self.controller.nesting_level = level;
        self
    }
}

/// Collaborators of a composite container.
#[derive(Clone)]
pub struct ContainerPorts {
    pub platform: Arc<dyn PlatformSinks>,
    pub frames: Arc<dyn FrameElementFactory>,
    pub upstream: Option<Arc<dyn UpstreamRequests>>,
    pub observer: Option<Arc<dyn CompositeObserver>>,
    pub catalog: LibraryCatalog,
}

impl ContainerPorts {
    pub fn new(platform: Arc<dyn PlatformSinks>, frames: Arc<dyn FrameElementFactory>) -> Self {
        Self {
            platform,
            frames,
            upstream: None,
            observer: None,
            catalog: LibraryCatalog::default(),
        }
    }

    #[must_use]
    pub fn with_upstream(mut self, upstream: Arc<dyn UpstreamRequests>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CompositeObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: LibraryCatalog) -> Self {
        self.catalog = catalog;
        self
    }
}

/// What one `sync_authored` pass did, per child id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub reloaded: Vec<SubInteractiveId>,
    pub unchanged: Vec<SubInteractiveId>,
    pub unmounted: Vec<SubInteractiveId>,
    pub removed: Vec<SubInteractiveId>,
    /// Children with neither a known library entry nor a URL.
    pub unresolved: Vec<SubInteractiveId>,
}

struct ContainerInner {
    kind: CompositeKind,
    config: ContainerConfig,
    ports: ContainerPorts,
    hub: Arc<LinkedStateHub>,
    authored: RwLock<CompositeAuthoredState>,
    state: RwLock<CompositeInteractiveState>,
    controllers: RwLock<HashMap<SubInteractiveId, Arc<ChildFrameController>>>,
    relay: Arc<ChildRelay>,
}

/// Receives child reports and folds them into the container.
struct ChildRelay {
    container: RwLock<Weak<ContainerInner>>,
}

impl ChildStateObserver for ChildRelay {
    fn interactive_state_changed(&self, subinteractive: &SubInteractiveId, state: &RuntimeState) {
        let container = self.container.read().upgrade();
        if let Some(container) = container {
            container.record_child_state(subinteractive, state);
        }
    }

    fn authored_state_changed(&self, subinteractive: &SubInteractiveId, authored: &AuthoredConfig) {
        let container = self.container.read().upgrade();
        if let Some(container) = container {
            container.record_child_authored(subinteractive, authored);
        }
    }
}

impl ContainerInner {
    fn record_child_state(&self, id: &SubInteractiveId, state: &RuntimeState) {
        let snapshot = {
            let mut aggregated = self.state.write();
            aggregated.record(id, state.clone());
            aggregated.clone()
        };
        debug!(kind = %self.kind, subinteractive_id = %id, "Child state aggregated");
        if let Some(observer) = &self.ports.observer {
            observer.interactive_state_changed(&snapshot);
        }
    }

    fn record_child_authored(&self, id: &SubInteractiveId, authored: &AuthoredConfig) {
        let snapshot = {
            let mut composite = self.authored.write();
            let Some(sub) = composite.find_mut(id) else {
                warn!(subinteractive_id = %id, "Authored state from unknown child");
                return;
            };
            sub.authored_state = authored.clone();
            composite.clone()
        };
        if let Some(observer) = &self.ports.observer {
            observer.authored_state_changed(&snapshot);
        }
    }

    fn notify_state(&self) {
        if let Some(observer) = &self.ports.observer {
            let snapshot = self.state.read().clone();
            observer.interactive_state_changed(&snapshot);
        }
    }

    fn controller_for(&self, id: &SubInteractiveId) -> Arc<ChildFrameController> {
        if let Some(existing) = self.controllers.read().get(id) {
            return Arc::clone(existing);
        }

        let initial = self.state.read().state_of(id);
        let linked: Arc<dyn LinkedStateRegistry> = self.hub.clone();
        let mut ports = ControllerPorts::new(Arc::clone(&self.ports.platform))
            .with_linked_registry(linked)
            .with_observer(self.relay.clone());
        if let Some(upstream) = &self.ports.upstream {
            ports = ports.with_upstream(Arc::clone(upstream));
        }
        let created = Arc::new(ChildFrameController::with_state(
            id.clone(),
            self.config.controller.clone(),
            ports,
            initial,
        ));

        Arc::clone(
            self.controllers
                .write()
                .entry(id.clone())
                .or_insert(created),
        )
    }

    fn mounts(&self, id: &SubInteractiveId, current: Option<&SubInteractiveId>) -> bool {
        self.kind.mounts_all() || current == Some(id)
    }

    /// Bring every controller in line with `authored` and the current position.
    fn apply(&self, authored: &CompositeAuthoredState) -> SyncReport {
        let mut report = SyncReport::default();
        let ids = authored.ids();
        let current = self.state.read().current_subinteractive_id.clone();

        let removed: Vec<(SubInteractiveId, Arc<ChildFrameController>)> = {
            let mut controllers = self.controllers.write();
            let stale: Vec<SubInteractiveId> = controllers
                .keys()
                .filter(|id| !ids.contains(id))
                .cloned()
                .collect();
            stale
                .into_iter()
                .filter_map(|id| controllers.remove(&id).map(|c| (id, c)))
                .collect()
        };
        for (id, controller) in removed {
            controller.teardown();
            self.ports.frames.release(&id);
            self.hub.forget(&id);
            report.removed.push(id);
        }

        for sub in &authored.subinteractives {
            let controller = self.controller_for(&sub.id);

            if !self.mounts(&sub.id, current.as_ref()) {
                if controller.has_element() {
                    controller.teardown();
                    self.ports.frames.release(&sub.id);
                    report.unmounted.push(sub.id.clone());
                }
                continue;
            }

            let Some(url) = self.ports.catalog.resolve(sub) else {
                warn!(subinteractive_id = %sub.id, "No URL for sub-interactive");
                report.unresolved.push(sub.id.clone());
                continue;
            };
            let desired = DesiredFrame::new(url, sub.authored_state.clone()).with_mode(self.config.mode);

            let outcome = match controller.render(desired) {
                SyncOutcome::Detached => {
                    let element = self.ports.frames.create(&sub.id);
                    controller.attach_element(element)
                }
                outcome => outcome,
            };
            match outcome {
                SyncOutcome::Reloaded(_) => report.reloaded.push(sub.id.clone()),
                SyncOutcome::Unchanged => report.unchanged.push(sub.id.clone()),
                SyncOutcome::Detached => {}
            }
        }
        report
    }

    /// Move to `target` and re-apply the render policy.
    fn navigate(&self, target: SubInteractiveId) {
        {
            let mut state = self.state.write();
            if state.current_subinteractive_id.as_ref() == Some(&target) {
                return;
            }
            state.current_subinteractive_id = Some(target.clone());
        }
        info!(kind = %self.kind, subinteractive_id = %target, "Navigated");

        if !self.kind.mounts_all() {
            let authored = self.authored.read().clone();
            self.apply(&authored);
        }
        self.notify_state();
    }
}

/// A composite interactive: carousel, scaffolded question or side-by-side.
pub struct CompositeContainer {
    inner: Arc<ContainerInner>,
}

impl CompositeContainer {
    /// Create an empty container.
    pub fn new(kind: CompositeKind, config: ContainerConfig, ports: ContainerPorts) -> Self {
        let relay = Arc::new(ChildRelay {
            container: RwLock::new(Weak::new()),
        });
        let inner = Arc::new(ContainerInner {
            kind,
            config,
            ports,
            hub: Arc::new(LinkedStateHub::new()),
            authored: RwLock::new(CompositeAuthoredState::default()),
            state: RwLock::new(CompositeInteractiveState::default()),
            controllers: RwLock::new(HashMap::new()),
            relay: Arc::clone(&relay),
        });
        *relay.container.write() = Arc::downgrade(&inner);
        Self { inner }
    }

    #[must_use]
    pub fn kind(&self) -> CompositeKind {
        self.inner.kind
    }

    /// Replace the authored configuration and reconcile every child.
    ///
    /// Missing ids are generated first. Children are matched by id, so
    /// reordering reloads nothing.
    pub fn sync_authored(&self, mut authored: CompositeAuthoredState) -> Result<SyncReport, CompositeError> {
        let assigned = authored.ensure_ids();
        if assigned > 0 {
            debug!(kind = %self.inner.kind, assigned, "Assigned sub-interactive ids");
        }
        authored.validate(self.inner.kind)?;

        *self.inner.authored.write() = authored.clone();
        {
            let ids = authored.ids();
            let mut state = self.inner.state.write();
            state.retain(&ids);
            if self.inner.kind.is_navigable() {
                state.current_subinteractive_id =
                    current_or_first(&ids, state.current_subinteractive_id.as_ref());
            }
        }

        let report = self.inner.apply(&authored);
        info!(
            kind = %self.inner.kind,
            reloaded = report.reloaded.len(),
            unchanged = report.unchanged.len(),
            removed = report.removed.len(),
            "Composite synchronized"
        );
        Ok(report)
    }

    /// Replace the aggregated runtime state (host init). Never reloads.
    pub fn set_interactive_state(&self, state: CompositeInteractiveState) {
        for (id, child_state) in &state.subinteractive_states {
            self.inner.hub.seed(id, child_state.clone());
        }
        let controllers: Vec<Arc<ChildFrameController>> =
            self.inner.controllers.read().values().cloned().collect();
        for controller in controllers {
            let seeded = state.state_of(controller.id());
            controller.update_interactive_state(|_| seeded);
        }
        *self.inner.state.write() = state;
    }

    /// Fold host-supplied state into the current one. Never reloads.
    ///
    /// Only children the host sends a value for are updated; the others
    /// keep their authoritative state. The current position moves only
    /// when the host names one.
    pub fn merge_interactive_state(&self, mut state: CompositeInteractiveState) {
        state.subinteractive_states.retain(|_, child_state| !child_state.is_null());
        for (id, child_state) in &state.subinteractive_states {
            self.inner.hub.seed(id, child_state.clone());
            let controller = self.inner.controllers.read().get(id).cloned();
            if let Some(controller) = controller {
                let supplied = child_state.clone();
                controller.update_interactive_state(|_| supplied);
            }
        }

        let mut aggregated = self.inner.state.write();
        for (id, child_state) in state.subinteractive_states {
            aggregated.record(&id, child_state);
        }
        if state.current_subinteractive_id.is_some() {
            aggregated.current_subinteractive_id = state.current_subinteractive_id;
        }
    }

    /// Aggregated runtime state.
    #[must_use]
    pub fn interactive_state(&self) -> CompositeInteractiveState {
        self.inner.state.read().clone()
    }

    /// Authored configuration, including child-reported changes.
    #[must_use]
    pub fn authored_state(&self) -> CompositeAuthoredState {
        self.inner.authored.read().clone()
    }

    /// Child currently shown.
    #[must_use]
    pub fn current(&self) -> Option<SubInteractiveId> {
        self.inner.state.read().current_subinteractive_id.clone()
    }

    /// Show `id` (carousel).
    pub fn go_to(&self, id: &SubInteractiveId) -> Result<(), CompositeError> {
        if self.inner.kind != CompositeKind::Carousel {
            return Err(CompositeError::NavigationUnsupported(self.inner.kind));
        }
        if self.inner.authored.read().find(id).is_none() {
            return Err(CompositeError::UnknownSubinteractive(id.clone()));
        }
        self.inner.navigate(id.clone());
        Ok(())
    }

    /// Next slide, staying on the last (carousel).
    pub fn next(&self) -> Result<SubInteractiveId, CompositeError> {
        if self.inner.kind != CompositeKind::Carousel {
            return Err(CompositeError::NavigationUnsupported(self.inner.kind));
        }
        self.step(next_id)
    }

    /// Previous slide, staying on the first (carousel).
    pub fn previous(&self) -> Result<SubInteractiveId, CompositeError> {
        if self.inner.kind != CompositeKind::Carousel {
            return Err(CompositeError::NavigationUnsupported(self.inner.kind));
        }
        self.step(previous_id)
    }

    /// Reveal the next level (scaffolded question). Forward only, one
    /// level per call, staying on the last.
    pub fn advance(&self) -> Result<SubInteractiveId, CompositeError> {
        if self.inner.kind != CompositeKind::ScaffoldedQuestion {
            return Err(CompositeError::NavigationUnsupported(self.inner.kind));
        }
        self.step(next_id)
    }

    fn step<F>(&self, pick: F) -> Result<SubInteractiveId, CompositeError>
    where
        F: Fn(&[SubInteractiveId], Option<&SubInteractiveId>) -> Option<SubInteractiveId>,
    {
        let ids = self.inner.authored.read().ids();
        let current = self.current();
        let target = pick(&ids, current.as_ref()).ok_or(CompositeError::Empty)?;
        self.inner.navigate(target.clone());
        Ok(target)
    }

    /// Flush every child and return the aggregated state.
    ///
    /// Children with a live channel are asked for their state; the others
    /// answer at once with their authoritative copy.
    pub async fn flush_all(&self, unloading: bool) -> CompositeInteractiveState {
        let controllers: Vec<Arc<ChildFrameController>> =
            self.inner.controllers.read().values().cloned().collect();

        let flushes = controllers.iter().map(|controller| {
            let id = controller.id().clone();
            let pending = controller.flush(unloading);
            async move { (id, pending.await) }
        });
        let results = join_all(flushes).await;

        {
            let mut state = self.inner.state.write();
            for (id, result) in results {
                match result {
                    Ok(child_state) => state.record(&id, child_state),
                    Err(e) => warn!(subinteractive_id = %id, error = %e, "Child flush failed"),
                }
            }
        }
        self.interactive_state()
    }

    /// Controller of one child.
    #[must_use]
    pub fn controller(&self, id: &SubInteractiveId) -> Option<Arc<ChildFrameController>> {
        self.inner.controllers.read().get(id).cloned()
    }

    /// Ids of children with a mounted frame.
    #[must_use]
    pub fn mounted(&self) -> Vec<SubInteractiveId> {
        let mut ids: Vec<SubInteractiveId> = self
            .inner
            .controllers
            .read()
            .iter()
            .filter(|(_, c)| c.has_element())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Sibling-state hub shared by the children.
    #[must_use]
    pub fn linked_hub(&self) -> Arc<LinkedStateHub> {
        Arc::clone(&self.inner.hub)
    }

    /// Tear down every child. Aggregated state is kept.
    pub fn teardown(&self) {
        let controllers: Vec<(SubInteractiveId, Arc<ChildFrameController>)> = self
            .inner
            .controllers
            .read()
            .iter()
            .map(|(id, c)| (id.clone(), Arc::clone(c)))
            .collect();
        for (id, controller) in controllers {
            controller.teardown();
            self.inner.ports.frames.release(&id);
        }
        info!(kind = %self.inner.kind, "Composite torn down");
    }
}

impl std::fmt::Debug for CompositeContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeContainer")
            .field("kind", &self.inner.kind)
            .field("children", &self.inner.controllers.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LoopbackFrameFactory;
    use crate::domain::SubInteractive;
    use qi_01_channel_transport::FrameElement;
    use qi_02_frame_controller::RecordingPlatform;
    use serde_json::json;
    use shared_types::events;

    fn id(s: &str) -> SubInteractiveId {
        SubInteractiveId::new(s)
    }

    fn container(kind: CompositeKind) -> (CompositeContainer, Arc<LoopbackFrameFactory>) {
        let frames = Arc::new(LoopbackFrameFactory::auto_ready());
        let platform = Arc::new(RecordingPlatform::new());
        let catalog = LibraryCatalog::new().with_entry("open-response", "https://or.example/");
        let ports = ContainerPorts::new(platform, frames.clone()).with_catalog(catalog);
        (
            CompositeContainer::new(kind, ContainerConfig::default(), ports),
            frames,
        )
    }

    fn three() -> CompositeAuthoredState {
        CompositeAuthoredState::new(vec![
            SubInteractive::with_url("a", "https://a.example/", json!({ "n": 1 })),
            SubInteractive::from_library("b", "open-response", json!({ "n": 2 })),
            SubInteractive::with_url("c", "https://c.example/", json!({ "n": 3 })),
        ])
    }

    #[test]
    fn test_carousel_mounts_all() {
        let (container, frames) = container(CompositeKind::Carousel);
        let report = container.sync_authored(three()).unwrap();
        assert_eq!(report.reloaded.len(), 3);
        assert_eq!(container.mounted(), vec![id("a"), id("b"), id("c")]);
        assert_eq!(
            frames.frame(&id("b")).unwrap().current_src().as_deref(),
            Some("https://or.example/")
        );
        assert_eq!(container.current(), Some(id("a")));
    }

    #[test]
    fn test_reorder_reloads_nothing() {
        let (container, frames) = container(CompositeKind::Carousel);
        container.sync_authored(three()).unwrap();

        let mut reordered = three();
        reordered.subinteractives.reverse();
        let report = container.sync_authored(reordered).unwrap();

        assert!(report.reloaded.is_empty());
        assert_eq!(report.unchanged.len(), 3);
        assert_eq!(frames.created(), 3);
        for sub in ["a", "b", "c"] {
            let window = frames.window(&id(sub)).unwrap();
            assert_eq!(window.count(events::INIT_INTERACTIVE), 1);
        }
    }

    #[test]
    fn test_one_child_changed_reloads_one() {
        let (container, _frames) = container(CompositeKind::Carousel);
        container.sync_authored(three()).unwrap();

        let mut edited = three();
        edited.subinteractives[2].authored_state = json!({ "n": 30 });
        let report = container.sync_authored(edited).unwrap();
        assert_eq!(report.reloaded, vec![id("c")]);
        assert_eq!(report.unchanged.len(), 2);
    }

    #[test]
    fn test_removed_child_torn_down() {
        let (container, frames) = container(CompositeKind::Carousel);
        container.sync_authored(three()).unwrap();
        let handle = container.controller(&id("c")).unwrap().channel().unwrap();

        let mut fewer = three();
        fewer.subinteractives.pop();
        let report = container.sync_authored(fewer).unwrap();

        assert_eq!(report.removed, vec![id("c")]);
        assert!(container.controller(&id("c")).is_none());
        assert!(frames.frame(&id("c")).is_none());
        assert_eq!(handle.state(), qi_01_channel_transport::ChannelState::Disconnected);
    }

    #[test]
    fn test_scaffolded_mounts_current_only() {
        let (container, _frames) = container(CompositeKind::ScaffoldedQuestion);
        container.sync_authored(three()).unwrap();
        assert_eq!(container.mounted(), vec![id("a")]);

        assert_eq!(container.advance().unwrap(), id("b"));
        assert_eq!(container.mounted(), vec![id("b")]);
        assert_eq!(container.advance().unwrap(), id("c"));
        assert_eq!(container.advance().unwrap(), id("c"));
        assert_eq!(container.mounted(), vec![id("c")]);
    }

    #[test]
    fn test_scaffolded_keeps_state_of_unmounted_level() {
        let (container, frames) = container(CompositeKind::ScaffoldedQuestion);
        container.sync_authored(three()).unwrap();
        frames
            .window(&id("a"))
            .unwrap()
            .emit(events::INTERACTIVE_STATE, json!({ "answer": "x" }));

        container.advance().unwrap();
        assert_eq!(
            container.interactive_state().state_of(&id("a")),
            json!({ "answer": "x" })
        );
        assert_eq!(
            container.controller(&id("a")).unwrap().interactive_state(),
            json!({ "answer": "x" })
        );
    }

    #[test]
    fn test_merge_keeps_unsupplied_children() {
        let (container, frames) = container(CompositeKind::ScaffoldedQuestion);
        container.sync_authored(three()).unwrap();
        frames
            .window(&id("a"))
            .unwrap()
            .emit(events::INTERACTIVE_STATE, json!({ "answer": "x" }));
        container.advance().unwrap();

        let mut supplied = CompositeInteractiveState::default();
        supplied.record(&id("c"), json!({ "answer": "from host" }));
        container.merge_interactive_state(supplied);

        assert_eq!(container.current(), Some(id("b")));
        assert_eq!(
            container.controller(&id("a")).unwrap().interactive_state(),
            json!({ "answer": "x" })
        );
        let state = container.interactive_state();
        assert_eq!(state.state_of(&id("a")), json!({ "answer": "x" }));
        assert_eq!(state.state_of(&id("c")), json!({ "answer": "from host" }));
        assert_eq!(
            container.controller(&id("c")).unwrap().interactive_state(),
            json!({ "answer": "from host" })
        );
    }

    #[test]
    fn test_carousel_navigation_clamps() {
        let (container, _frames) = container(CompositeKind::Carousel);
        container.sync_authored(three()).unwrap();
        assert_eq!(container.previous().unwrap(), id("a"));
        assert_eq!(container.next().unwrap(), id("b"));
        container.go_to(&id("c")).unwrap();
        assert_eq!(container.next().unwrap(), id("c"));
        assert_eq!(
            container.go_to(&id("zzz")),
            Err(CompositeError::UnknownSubinteractive(id("zzz")))
        );
        assert_eq!(
            container.advance(),
            Err(CompositeError::NavigationUnsupported(CompositeKind::Carousel))
        );
    }

    #[test]
    fn test_side_by_side_limit() {
        let (container, _frames) = container(CompositeKind::SideBySide);
        assert!(matches!(
            container.sync_authored(three()),
            Err(CompositeError::TooManySubinteractives { max: 2, count: 3, .. })
        ));
    }

    #[test]
    fn test_missing_ids_generated_and_kept() {
        let (container, _frames) = container(CompositeKind::Carousel);
        let authored = CompositeAuthoredState::new(vec![SubInteractive::with_url(
            "",
            "https://a.example/",
            json!({}),
        )]);
        container.sync_authored(authored).unwrap();
        let stored = container.authored_state();
        assert!(!stored.subinteractives[0].id.is_empty());

        let report = container.sync_authored(stored).unwrap();
        assert_eq!(report.unchanged.len(), 1);
    }

    #[test]
    fn test_unresolved_child_reported() {
        let (container, _frames) = container(CompositeKind::Carousel);
        let authored = CompositeAuthoredState::new(vec![SubInteractive::from_library(
            "a",
            "not-in-catalog",
            json!({}),
        )]);
        let report = container.sync_authored(authored).unwrap();
        assert_eq!(report.unresolved, vec![id("a")]);
    }

    #[test]
    fn test_host_state_reaches_handshake() {
        let (container, frames) = container(CompositeKind::Carousel);
        let mut state = CompositeInteractiveState::default();
        state.record(&id("b"), json!({ "answer": "saved" }));
        container.set_interactive_state(state);
        container.sync_authored(three()).unwrap();

        let init: shared_types::InitInteractive = frames.window(&id("b")).unwrap()
            .received_named(events::INIT_INTERACTIVE)[0]
            .decode()
            .unwrap();
        assert_eq!(init.interactive_state, json!({ "answer": "saved" }));
    }

    #[test]
    fn test_child_reports_reach_observer_without_reload() {
        let frames = Arc::new(LoopbackFrameFactory::auto_ready());
        let observer = Arc::new(crate::adapters::RecordingCompositeObserver::new());
        let ports = ContainerPorts::new(Arc::new(RecordingPlatform::new()), frames.clone())
            .with_observer(observer.clone());
        let container = CompositeContainer::new(
            CompositeKind::Carousel,
            ContainerConfig::default(),
            ports,
        );
        let mut authored = three();
        authored.subinteractives.truncate(1);
        container.sync_authored(authored).unwrap();

        let window = frames.window(&id("a")).unwrap();
        window.emit(events::INTERACTIVE_STATE, json!({ "step": 2 }));
        window.emit(events::AUTHORED_STATE, json!({ "n": 99 }));

        let last = observer.last_state().unwrap();
        assert_eq!(last.state_of(&id("a")), json!({ "step": 2 }));
        let reported = observer.authored().pop().unwrap();
        assert_eq!(reported.subinteractives[0].authored_state, json!({ "n": 99 }));

        let report = container.sync_authored(reported).unwrap();
        assert_eq!(report.unchanged, vec![id("a")]);
        assert_eq!(window.count(events::INIT_INTERACTIVE), 1);
    }

    #[tokio::test]
    async fn test_flush_all_collects_children() {
        let frames = Arc::new(LoopbackFrameFactory::auto_ready().with_responder(Arc::new(
            |msg: &shared_types::FrameMessage| {
                if msg.event == events::GET_INTERACTIVE_STATE {
                    vec![shared_types::FrameMessage::new(
                        events::INTERACTIVE_STATE,
                        json!({ "flushed": true }),
                    )]
                } else {
                    Vec::new()
                }
            },
        )));
        let ports = ContainerPorts::new(Arc::new(RecordingPlatform::new()), frames.clone());
        let container = CompositeContainer::new(
            CompositeKind::SideBySide,
            ContainerConfig::default(),
            ports,
        );
        let mut authored = three();
        authored.subinteractives.truncate(1);
        authored
            .subinteractives
            .push(SubInteractive::with_url("d", "https://d.example/", json!({})));
        container.sync_authored(authored).unwrap();

        let state = container.flush_all(true).await;
        assert_eq!(state.state_of(&id("a")), json!({ "flushed": true }));
        assert_eq!(state.state_of(&id("d")), json!({ "flushed": true }));
    }
}
