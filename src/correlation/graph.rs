//! Static service dependency graph.
//!
//! Maps an upstream service to the services that depend on it. Read-only
//! after process start; the correlation engine shares it behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping from an upstream service name to its direct downstream dependents.
///
/// When an upstream service fires an alert, alerts from any of its
/// dependents within the correlation window are considered caused by the
/// same fault and are suppressed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServiceDependencyGraph {
    dependents: HashMap<String, Vec<String>>,
}

impl ServiceDependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph from an existing dependency map.
    pub fn from_map(dependents: HashMap<String, Vec<String>>) -> Self {
        Self { dependents }
    }

    /// Register an upstream service and its direct dependents.
    pub fn with_service<I, S>(mut self, upstream: &str, dependents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependents
            .entry(upstream.to_string())
            .or_default()
            .extend(dependents.into_iter().map(Into::into));
        self
    }

    /// Direct dependents of a service. Empty if the service is unknown.
    pub fn dependents_of(&self, upstream: &str) -> &[String] {
        self.dependents.get(upstream).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if the service appears as an upstream key with at least one
    /// known dependent.
    pub fn has_dependents(&self, service: &str) -> bool {
        !self.dependents_of(service).is_empty()
    }

    /// True if `candidate` is causally downstream of `upstream`.
    ///
    /// Checks direct dependents first, then exactly one level of transitive
    /// traversal (upstream → X → candidate). The one-hop bound is an
    /// intentional precision/noise trade-off, not a full graph search.
    pub fn is_downstream(&self, upstream: &str, candidate: &str) -> bool {
        let direct = self.dependents_of(upstream);
        if direct.iter().any(|d| d == candidate) {
            return true;
        }
        direct
            .iter()
            .any(|d| self.dependents_of(d).iter().any(|dd| dd == candidate))
    }

    /// Number of upstream services in the graph.
    pub fn len(&self) -> usize {
        self.dependents.len()
    }

    /// True if the graph has no entries.
    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }
}
