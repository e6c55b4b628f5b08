//! # Listener Registry
//!
//! Named-event handlers registered on one channel. Every registration is
//! recorded so it can be removed symmetrically on disconnect.

use shared_types::ListenerId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handler invoked with the payload of each inbound message of its event.
pub type Handler = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

/// Record of one `add_listener` call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerRegistration {
    event: String,
    id: ListenerId,
}

impl ListenerRegistration {
    /// A registration that was never stored anywhere.
    pub(crate) fn detached(event: &str) -> Self {
        Self {
            event: event.to_string(),
            id: ListenerId::new(),
        }
    }

    /// Event the listener is registered for.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Id of the listener.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

/// Handlers grouped by event name. Multiple handlers per event all fire,
/// in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    by_event: HashMap<String, Vec<(ListenerId, Handler)>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `event`.
    pub fn add(&mut self, event: &str, handler: Handler) -> ListenerRegistration {
        let id = ListenerId::new();
        self.by_event
            .entry(event.to_string())
            .or_default()
            .push((id, handler));
        ListenerRegistration {
            event: event.to_string(),
            id,
        }
    }

    /// Remove one registration. Returns whether it was present.
    pub fn remove(&mut self, registration: &ListenerRegistration) -> bool {
        let Some(handlers) = self.by_event.get_mut(&registration.event) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != registration.id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            self.by_event.remove(&registration.event);
        }
        removed
    }

    /// Snapshot of the handlers for `event`.
    ///
    /// Handlers are cloned out so they can run without holding any lock.
    #[must_use]
    pub fn handlers_for(&self, event: &str) -> Vec<Handler> {
        self.by_event
            .get(event)
            .map(|handlers| handlers.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default()
    }

    /// Total number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_event.values().map(Vec::len).sum()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_event.is_empty()
    }

    /// Remove every handler. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.len();
        self.by_event.clear();
        count
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .by_event
            .iter()
            .map(|(event, handlers)| (event.as_str(), handlers.len()))
            .collect();
        f.debug_struct("ListenerRegistry")
            .field("handlers", &counts)
            .finish()
    }
}
