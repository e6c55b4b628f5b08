//! # State Synchronizer
//!
//! Keeps the two views of a child's state:
//!
//! - the authored configuration the child was last handed (or reported),
//!   compared structurally to decide reloads;
//! - the runtime state, held in a shared [`RuntimeCell`] that is the
//!   authoritative copy, plus the last value the child reported.
//!
//! Runtime updates never cause a reload.

use crate::domain::reload::{should_reload, DesiredFrame, ReloadDecision};
use parking_lot::RwLock;
use shared_types::{AuthoredConfig, RuntimeState};
use std::sync::Arc;

/// Authoritative runtime state of one child.
///
/// Read at handshake time rather than captured, so a connection made long
/// after the last update still sees the latest value.
#[derive(Debug, Clone, Default)]
pub struct RuntimeCell {
    inner: Arc<RwLock<RuntimeState>>,
}

impl RuntimeCell {
    /// Cell holding `initial`.
    pub fn new(initial: RuntimeState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> RuntimeState {
        self.inner.read().clone()
    }

    /// Replace the value.
    pub fn set(&self, state: RuntimeState) {
        *self.inner.write() = state;
    }

    /// Functional update against the previous value. Returns the new value.
    pub fn update<F>(&self, f: F) -> RuntimeState
    where
        F: FnOnce(&RuntimeState) -> RuntimeState,
    {
        let mut guard = self.inner.write();
        let next = f(&guard);
        *guard = next.clone();
        next
    }
}

/// Per-controller reconciliation state.
#[derive(Debug, Default)]
pub struct StateSynchronizer {
    last_known_child_authored: Option<AuthoredConfig>,
    last_observed_runtime: Option<RuntimeState>,
}

impl StateSynchronizer {
    /// Fresh synchronizer: the first render always loads.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload decision for `desired` against the frame's current source.
    #[must_use]
    pub fn decide(&self, current_src: Option<&str>, desired: &DesiredFrame) -> ReloadDecision {
        should_reload(
            current_src,
            self.last_known_child_authored.as_ref(),
            desired,
        )
    }

    /// Record what the child is about to be handed, before it confirms.
    ///
    /// Recording early keeps a render that fires again before the child is
    /// ready from starting a second reload.
    pub fn record_handed_authored(&mut self, authored: AuthoredConfig) {
        self.last_known_child_authored = Some(authored);
        self.last_observed_runtime = None;
    }

    /// The child reported its own authored state (authoring mode).
    pub fn accept_child_authored(&mut self, authored: AuthoredConfig) {
        self.last_known_child_authored = Some(authored);
    }

    /// The child reported runtime state.
    pub fn observe_runtime(&mut self, state: RuntimeState) {
        self.last_observed_runtime = Some(state);
    }

    /// Authored state the child is believed to hold.
    #[must_use]
    pub fn last_known_child_authored(&self) -> Option<&AuthoredConfig> {
        self.last_known_child_authored.as_ref()
    }

    /// Runtime state last reported by the current child document.
    #[must_use]
    pub fn last_observed_runtime(&self) -> Option<&RuntimeState> {
        self.last_observed_runtime.as_ref()
    }

    /// Forget everything: the next render reloads.
    pub fn reset(&mut self) {
        self.last_known_child_authored = None;
        self.last_observed_runtime = None;
    }
}
