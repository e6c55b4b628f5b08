//! Platform Adapters
//!
//! `TracingPlatform` writes platform events to the log, for native hosts
//! without a UI. `RecordingPlatform` keeps them in memory for tests.

use parking_lot::RwLock;
use serde_json::Value;
use shared_types::{AuthoredConfig, RuntimeState, ShowModalRequest, SubInteractiveId};
use tracing::{info, warn};

use crate::ports::{ChildStateObserver, HintSink, PlatformSinks};

/// Platform sinks backed by `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPlatform;

impl PlatformSinks for TracingPlatform {
    fn log(&self, action: &str, data: &Value) {
        info!(action, %data, "Interactive log event");
    }

    fn show_modal(&self, request: &ShowModalRequest) {
        info!(kind = %request.kind, "Show modal");
    }

    fn close_modal(&self, _options: &Value) {
        info!("Close modal");
    }

    fn alert(&self, message: &str) {
        warn!(message, "Alert");
    }
}

/// In-memory recorder for every sink and observer callback.
#[derive(Default)]
pub struct RecordingPlatform {
    logs: RwLock<Vec<(String, Value)>>,
    modals: RwLock<Vec<ShowModalRequest>>,
    closed_modals: RwLock<usize>,
    alerts: RwLock<Vec<String>>,
    hints: RwLock<Vec<(String, Value)>>,
    states: RwLock<Vec<(SubInteractiveId, RuntimeState)>>,
    authored: RwLock<Vec<(SubInteractiveId, AuthoredConfig)>>,
    heights: RwLock<Vec<(SubInteractiveId, f64)>>,
}

impl RecordingPlatform {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(action, data)` log events.
    pub fn logs(&self) -> Vec<(String, Value)> {
        self.logs.read().clone()
    }

    /// Recorded modal requests.
    pub fn modals(&self) -> Vec<ShowModalRequest> {
        self.modals.read().clone()
    }

    /// Number of close-modal calls.
    pub fn closed_modals(&self) -> usize {
        *self.closed_modals.read()
    }

    /// Recorded alert texts.
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.read().clone()
    }

    /// Recorded `(subinteractive id, hint)` pairs.
    pub fn hints(&self) -> Vec<(String, Value)> {
        self.hints.read().clone()
    }

    /// Runtime states reported for one sub-interactive, oldest first.
    pub fn states_for(&self, id: &str) -> Vec<RuntimeState> {
        self.states
            .read()
            .iter()
            .filter(|(sub, _)| sub.as_str() == id)
            .map(|(_, state)| state.clone())
            .collect()
    }

    /// Authored states reported for one sub-interactive, oldest first.
    pub fn authored_for(&self, id: &str) -> Vec<AuthoredConfig> {
        self.authored
            .read()
            .iter()
            .filter(|(sub, _)| sub.as_str() == id)
            .map(|(_, authored)| authored.clone())
            .collect()
    }

    /// Heights reported for one sub-interactive, oldest first.
    pub fn heights_for(&self, id: &str) -> Vec<f64> {
        self.heights
            .read()
            .iter()
            .filter(|(sub, _)| sub.as_str() == id)
            .map(|(_, height)| *height)
            .collect()
    }
}

impl PlatformSinks for RecordingPlatform {
    fn log(&self, action: &str, data: &Value) {
        self.logs.write().push((action.to_string(), data.clone()));
    }

    fn show_modal(&self, request: &ShowModalRequest) {
        self.modals.write().push(request.clone());
    }

    fn close_modal(&self, _options: &Value) {
        *self.closed_modals.write() += 1;
    }

    fn alert(&self, message: &str) {
        self.alerts.write().push(message.to_string());
    }
}

impl HintSink for RecordingPlatform {
    fn set_hint(&self, subinteractive: &SubInteractiveId, hint: &Value) {
        self.hints
            .write()
            .push((subinteractive.to_string(), hint.clone()));
    }
}

impl ChildStateObserver for RecordingPlatform {
    fn interactive_state_changed(&self, subinteractive: &SubInteractiveId, state: &RuntimeState) {
        self.states
            .write()
            .push((subinteractive.clone(), state.clone()));
    }

    fn authored_state_changed(&self, subinteractive: &SubInteractiveId, authored: &AuthoredConfig) {
        self.authored
            .write()
            .push((subinteractive.clone(), authored.clone()));
    }

    fn height_changed(&self, subinteractive: &SubInteractiveId, height: f64) {
        self.heights.write().push((subinteractive.clone(), height));
    }
}
