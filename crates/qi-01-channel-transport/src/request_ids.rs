//! # Request Id Mapper
//!
//! Rewrites the ids of requests proxied one level up so they cannot collide
//! with the upstream host's own in-flight requests.
//!
//! ## Scheme
//!
//! - Upstream ids are allocated sequentially from `base` (default
//!   `1_000_000`), an out-of-band range children never use.
//! - Each rewritten id remembers the child's original id and a route
//!   (who asked), restored exactly once when the response comes back.
//! - Pending entries are bounded; when full the oldest entry is evicted.

use shared_types::RequestId;
use std::collections::{HashMap, VecDeque};
use tracing::warn;

/// Where a proxied response has to go back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest<R> {
    /// Id the child used.
    pub original_id: RequestId,
    /// Caller-defined route, e.g. the sub-interactive that asked.
    pub route: R,
}

/// Bounded map from rewritten upstream ids back to original ids.
#[derive(Debug)]
pub struct RequestIdMapper<R> {
    base: RequestId,
    next: RequestId,
    max_pending: usize,
    pending: HashMap<RequestId, PendingRequest<R>>,
    order: VecDeque<RequestId>,
}

impl<R> RequestIdMapper<R> {
    /// Start of the out-of-band id range.
    pub const DEFAULT_BASE: RequestId = 1_000_000;

    /// Maximum in-flight proxied requests.
    pub const DEFAULT_MAX_PENDING: usize = 256;

    /// Create a mapper with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_BASE, Self::DEFAULT_MAX_PENDING)
    }

    /// Create a mapper with a custom base and bound.
    #[must_use]
    pub fn with_config(base: RequestId, max_pending: usize) -> Self {
        Self {
            base,
            next: base,
            max_pending: max_pending.max(1),
            pending: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Allocate an upstream id for a request the child sent as `original_id`.
    pub fn rewrite(&mut self, original_id: RequestId, route: R) -> RequestId {
        while self.pending.len() >= self.max_pending {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if let Some(evicted) = self.pending.remove(&oldest) {
                warn!(
                    upstream_id = oldest,
                    original_id = evicted.original_id,
                    "Evicting unanswered proxied request"
                );
            }
        }

        let upstream_id = self.next;
        self.next = self.next.checked_add(1).unwrap_or(self.base);
        self.pending.insert(
            upstream_id,
            PendingRequest {
                original_id,
                route,
            },
        );
        self.order.push_back(upstream_id);
        upstream_id
    }

    /// Take back the original id for an upstream response.
    ///
    /// Returns `None` for ids this mapper never issued or already restored.
    pub fn restore(&mut self, upstream_id: RequestId) -> Option<PendingRequest<R>> {
        let entry = self.pending.remove(&upstream_id)?;
        self.order.retain(|id| *id != upstream_id);
        Some(entry)
    }

    /// Route of a pending request, without restoring it.
    #[must_use]
    pub fn route(&self, upstream_id: RequestId) -> Option<&R> {
        self.pending.get(&upstream_id).map(|entry| &entry.route)
    }

    /// Whether `id` lies in the rewritten range.
    #[must_use]
    pub fn is_out_of_band(&self, id: RequestId) -> bool {
        id >= self.base
    }

    /// Number of requests awaiting a response.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drop every pending entry whose route matches `predicate`.
    pub fn forget_matching<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&R) -> bool,
    {
        let before = self.pending.len();
        self.pending.retain(|_, entry| !predicate(&entry.route));
        let pending = &self.pending;
        self.order.retain(|id| pending.contains_key(id));
        before - self.pending.len()
    }
}

impl<R> Default for RequestIdMapper<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_and_restore() {
        let mut mapper: RequestIdMapper<&str> = RequestIdMapper::new();
        let upstream = mapper.rewrite(7, "child-a");
        assert_eq!(upstream, 1_000_000);
        assert!(mapper.is_out_of_band(upstream));

        let restored = mapper.restore(upstream).unwrap();
        assert_eq!(restored.original_id, 7);
        assert_eq!(restored.route, "child-a");
        assert!(mapper.restore(upstream).is_none());
    }

    #[test]
    fn test_same_original_id_from_two_children() {
        let mut mapper = RequestIdMapper::new();
        let a = mapper.rewrite(1, "a");
        let b = mapper.rewrite(1, "b");
        assert_ne!(a, b);
        assert_eq!(mapper.restore(b).unwrap().route, "b");
        assert_eq!(mapper.restore(a).unwrap().route, "a");
    }

    #[test]
    fn test_unknown_id_not_restored() {
        let mut mapper: RequestIdMapper<()> = RequestIdMapper::new();
        assert!(mapper.restore(42).is_none());
        assert!(!mapper.is_out_of_band(42));
    }

    #[test]
    fn test_eviction_when_full() {
        let mut mapper = RequestIdMapper::with_config(100, 2);
        let first = mapper.rewrite(1, ());
        mapper.rewrite(2, ());
        mapper.rewrite(3, ());
        assert_eq!(mapper.pending(), 2);
        assert!(mapper.restore(first).is_none());
    }

    #[test]
    fn test_route_leaves_entry_pending() {
        let mut mapper = RequestIdMapper::new();
        let upstream = mapper.rewrite(4, "a");
        assert_eq!(mapper.route(upstream), Some(&"a"));
        assert_eq!(mapper.pending(), 1);
        assert_eq!(mapper.restore(upstream).unwrap().original_id, 4);
        assert_eq!(mapper.route(upstream), None);
    }

    #[test]
    fn test_forget_matching() {
        let mut mapper = RequestIdMapper::new();
        mapper.rewrite(1, "a");
        mapper.rewrite(2, "b");
        mapper.rewrite(3, "a");
        assert_eq!(mapper.forget_matching(|route| *route == "a"), 2);
        assert_eq!(mapper.pending(), 1);
    }
}
