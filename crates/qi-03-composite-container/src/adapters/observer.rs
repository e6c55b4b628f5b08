//! Recording composite observer, for tests and the demo harness.

use parking_lot::Mutex;

use crate::domain::{CompositeAuthoredState, CompositeInteractiveState};
use crate::ports::CompositeObserver;

/// Keeps every report it receives.
#[derive(Debug, Default)]
pub struct RecordingCompositeObserver {
    states: Mutex<Vec<CompositeInteractiveState>>,
    authored: Mutex<Vec<CompositeAuthoredState>>,
}

impl RecordingCompositeObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregated states reported so far.
    #[must_use]
    pub fn states(&self) -> Vec<CompositeInteractiveState> {
        self.states.lock().clone()
    }

    #[must_use]
    pub fn last_state(&self) -> Option<CompositeInteractiveState> {
        self.states.lock().last().cloned()
    }

    /// Authored states reported so far.
    #[must_use]
    pub fn authored(&self) -> Vec<CompositeAuthoredState> {
        self.authored.lock().clone()
    }
}

impl CompositeObserver for RecordingCompositeObserver {
    fn interactive_state_changed(&self, state: &CompositeInteractiveState) {
        self.states.lock().push(state.clone());
    }

    fn authored_state_changed(&self, authored: &CompositeAuthoredState) {
        self.authored.lock().push(authored.clone());
    }
}
