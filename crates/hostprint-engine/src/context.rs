//! Per-pass exploration state
//!
//! Holds the instance cache and the in-flight set for one fingerprinting
//! pass. The context is owned by the [`InstanceFactory`](crate::InstanceFactory)
//! and dropped with it; nothing here is process-wide.

use hostprint_sdk::HostValue;
use rustc_hash::{FxHashMap, FxHashSet};

/// Instance cache and recursion guard for one pass
#[derive(Default)]
pub struct ExplorationContext {
    /// Resolved types: `Some(instance)` or `None` for "failed, do not retry"
    instances: FxHashMap<String, Option<HostValue>>,
    /// Types currently mid-construction
    in_flight: FxHashSet<String>,
}

impl ExplorationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached outcome for a type, if one was recorded
    pub fn cached(&self, type_name: &str) -> Option<&Option<HostValue>> {
        self.instances.get(type_name)
    }

    /// Whether an outcome (instance or null) is cached for the type
    pub fn is_cached(&self, type_name: &str) -> bool {
        self.instances.contains_key(type_name)
    }

    /// Record the outcome of a construction attempt
    pub fn cache(&mut self, type_name: impl Into<String>, instance: Option<HostValue>) {
        self.instances.insert(type_name.into(), instance);
    }

    /// Whether the type is currently being constructed
    pub fn is_in_flight(&self, type_name: &str) -> bool {
        self.in_flight.contains(type_name)
    }

    /// Mark the type as being constructed. Returns false if it already was.
    pub fn begin(&mut self, type_name: &str) -> bool {
        self.in_flight.insert(type_name.to_string())
    }

    /// Clear the in-flight marker
    pub fn finish(&mut self, type_name: &str) {
        self.in_flight.remove(type_name);
    }

    /// Number of cached outcomes
    pub fn cache_len(&self) -> usize {
        self.instances.len()
    }

    /// Number of types currently in flight
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}

/// Object identities already expanded by one top-level explore call
#[derive(Default)]
pub struct VisitedSet {
    seen: FxHashSet<usize>,
}

impl VisitedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the value's allocation was already expanded.
    /// Inline values (primitives, strings) are never considered visited.
    pub fn contains(&self, value: &HostValue) -> bool {
        value.identity().is_some_and(|id| self.seen.contains(&id))
    }

    /// Mark the value's allocation as expanded
    pub fn insert(&mut self, value: &HostValue) {
        if let Some(id) = value.identity() {
            self.seen.insert(id);
        }
    }

    /// Number of expanded allocations
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if nothing was expanded yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_finish() {
        let mut ctx = ExplorationContext::new();
        assert!(ctx.begin("pkg.A"));
        assert!(!ctx.begin("pkg.A"));
        assert!(ctx.is_in_flight("pkg.A"));
        ctx.finish("pkg.A");
        assert!(!ctx.is_in_flight("pkg.A"));
        assert_eq!(ctx.in_flight_len(), 0);
    }

    #[test]
    fn test_cached_null_is_distinct_from_missing() {
        let mut ctx = ExplorationContext::new();
        ctx.cache("pkg.Broken", None);
        assert!(ctx.is_cached("pkg.Broken"));
        assert!(matches!(ctx.cached("pkg.Broken"), Some(None)));
        assert!(ctx.cached("pkg.Other").is_none());
    }

    #[test]
    fn test_visited_by_identity() {
        let list = HostValue::list(vec![HostValue::Int(1)]);
        let same = list.clone();
        let other = HostValue::list(vec![HostValue::Int(1)]);

        let mut visited = VisitedSet::new();
        visited.insert(&list);
        assert!(visited.contains(&same));
        assert!(!visited.contains(&other));

        visited.insert(&HostValue::Int(3));
        assert!(!visited.contains(&HostValue::Int(3)));
        assert_eq!(visited.len(), 1);
    }
}
