//! Deterministic rule-based alert correlation engine.
//!
//! Not ML-based. Ingests alerts one at a time, groups them into
//! [`CorrelatedAlertGroup`]s by walking the service dependency graph, and
//! suppresses child alerts whose service is a downstream dependent of an
//! already-known root cause. All state is held in memory behind one async
//! lock with a rolling time window.

use crate::core::{new_id, now};
use crate::correlation::alert::{Alert, CorrelatedAlertGroup};
use crate::correlation::graph::ServiceDependencyGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Snapshot of correlation engine state counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationStats {
    /// Number of active correlation groups
    pub active_groups: usize,
    /// Number of alerts in the rolling buffer
    pub buffered_alerts: usize,
    /// Total suppressed alerts across all active groups
    pub total_suppressed: usize,
}

#[derive(Default)]
struct EngineState {
    buffer: Vec<Alert>,
    groups: HashMap<String, CorrelatedAlertGroup>,
}

/// Alert correlation engine.
///
/// Owned by the service's composition root and shared by reference across
/// request handlers; every mutation happens inside one critical section, so
/// `ingest_alert` is atomic and ingestion order is lock-acquisition order.
pub struct AlertCorrelationEngine {
    window_seconds: i64,
    max_buffer_size: usize,
    graph: Arc<ServiceDependencyGraph>,
    state: Mutex<EngineState>,
}

impl AlertCorrelationEngine {
    /// Create an engine over a dependency graph with default tuning
    /// (60 second window, 1000 alert buffer cap).
    pub fn new(graph: Arc<ServiceDependencyGraph>) -> Self {
        Self {
            window_seconds: 60,
            max_buffer_size: 1000,
            graph,
            state: Mutex::new(EngineState::default()),
        }
    }

    /// Set the sliding correlation window in seconds. State older than
    /// twice this value is pruned.
    pub fn with_window_seconds(mut self, window_seconds: i64) -> Self {
        self.window_seconds = window_seconds;
        self
    }

    /// Set the hard cap on buffered alerts.
    pub fn with_max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = max_buffer_size;
        self
    }

    /// Ingest an alert and attempt correlation.
    ///
    /// Returns `None` when the alert is suppressed as a child of an existing
    /// group. Returns the created or extended group otherwise: a registered
    /// root-cause group when buffered downstream alerts exist or the service
    /// has known dependents, or an unregistered standalone group wrapping
    /// just this alert.
    pub async fn ingest_alert(&self, mut alert: Alert) -> Option<CorrelatedAlertGroup> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        self.prune_stale(state);

        // Child of an existing root-cause group? First match wins.
        for group in state.groups.values_mut() {
            if group.tenant_id != alert.tenant_id {
                continue;
            }
            let Some(root) = &group.root_cause else { continue };
            if self.graph.is_downstream(&root.service_name, &alert.service_name) {
                info!(
                    alert_id = %alert.id,
                    group_id = %group.group_id,
                    root_service = %root.service_name,
                    child_service = %alert.service_name,
                    tenant_id = %alert.tenant_id,
                    "alert suppressed"
                );
                alert.correlated_group_id = Some(group.group_id.clone());
                group.suppress(alert.clone());
                state.buffer.push(alert);
                return None;
            }
        }

        // Root cause of already-buffered downstream alerts? Alerts that
        // already belong to a group stay with it.
        let downstream: Vec<usize> = state
            .buffer
            .iter()
            .enumerate()
            .filter(|(_, a)| {
                a.tenant_id == alert.tenant_id
                    && a.id != alert.id
                    && a.correlated_group_id.is_none()
                    && alert.timestamp - a.timestamp <= chrono::Duration::seconds(self.window_seconds)
                    && self.graph.is_downstream(&alert.service_name, &a.service_name)
            })
            .map(|(i, _)| i)
            .collect();

        if !downstream.is_empty() {
            let group_id = new_id();
            alert.is_root_cause = true;
            alert.correlated_group_id = Some(group_id.clone());

            let mut related = Vec::with_capacity(downstream.len());
            for i in downstream {
                state.buffer[i].correlated_group_id = Some(group_id.clone());
                related.push(state.buffer[i].clone());
            }

            info!(
                alert_id = %alert.id,
                service = %alert.service_name,
                suppressed = related.len(),
                tenant_id = %alert.tenant_id,
                group_id = %group_id,
                "root cause identified"
            );

            state.buffer.push(alert.clone());
            let group = CorrelatedAlertGroup {
                group_id: group_id.clone(),
                tenant_id: alert.tenant_id.clone(),
                root_cause: Some(alert),
                suppressed_count: related.len(),
                related_alerts: related,
                started_at: now(),
            };
            state.groups.insert(group_id, group.clone());
            return Some(group);
        }

        // Known upstream with no downstream alerts yet: register a potential
        // root cause so later children attach within the window.
        if self.graph.has_dependents(&alert.service_name) {
            let group_id = new_id();
            alert.is_root_cause = true;
            alert.correlated_group_id = Some(group_id.clone());

            info!(
                alert_id = %alert.id,
                service = %alert.service_name,
                tenant_id = %alert.tenant_id,
                group_id = %group_id,
                "potential root cause registered"
            );

            state.buffer.push(alert.clone());
            let group = CorrelatedAlertGroup {
                group_id: group_id.clone(),
                tenant_id: alert.tenant_id.clone(),
                root_cause: Some(alert),
                related_alerts: Vec::new(),
                started_at: now(),
                suppressed_count: 0,
            };
            state.groups.insert(group_id, group.clone());
            return Some(group);
        }

        // Standalone alert from a service with no known dependents. The
        // group is never registered and cannot absorb future children.
        state.buffer.push(alert.clone());
        Some(CorrelatedAlertGroup::new(alert, Vec::new()))
    }

    /// All currently active correlation groups, in no particular order.
    pub async fn get_active_groups(&self) -> Vec<CorrelatedAlertGroup> {
        let state = self.state.lock().await;
        state.groups.values().cloned().collect()
    }

    /// Look up a correlation group by id. `None` if unknown or pruned.
    pub async fn get_group(&self, group_id: &str) -> Option<CorrelatedAlertGroup> {
        let state = self.state.lock().await;
        state.groups.get(group_id).cloned()
    }

    /// Current engine state counters.
    pub async fn get_statistics(&self) -> CorrelationStats {
        let state = self.state.lock().await;
        CorrelationStats {
            active_groups: state.groups.len(),
            buffered_alerts: state.buffer.len(),
            total_suppressed: state.groups.values().map(|g| g.suppressed_count).sum(),
        }
    }

    /// Remove alerts and groups older than twice the correlation window,
    /// then enforce the buffer hard cap by keeping only the most recent
    /// entries. Runs at the start of every ingest while holding the lock;
    /// there is no background task.
    fn prune_stale(&self, state: &mut EngineState) {
        let cutoff = now() - chrono::Duration::seconds(self.window_seconds * 2);
        state.buffer.retain(|a| a.timestamp > cutoff);
        state.groups.retain(|_, g| g.started_at >= cutoff);

        if state.buffer.len() > self.max_buffer_size {
            let excess = state.buffer.len() - self.max_buffer_size;
            state.buffer.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::alert::AlertSeverity;
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    fn graph() -> Arc<ServiceDependencyGraph> {
        Arc::new(
            ServiceDependencyGraph::new()
                .with_service("platform-core", ["data-layer", "event-bus"])
                .with_service("data-layer", ["governance", "model-registry", "finops"])
                .with_service("event-bus", ["billing"]),
        )
    }

    fn engine() -> AlertCorrelationEngine {
        AlertCorrelationEngine::new(graph())
    }

    fn alert(service: &str, tenant: &str) -> Alert {
        Alert::new(service, tenant, AlertSeverity::Warning, "test alert")
    }

    #[tokio::test]
    async fn test_upstream_after_downstream_creates_group() {
        let engine = engine();

        // Downstream alert sits in the buffer first
        let downstream = alert("governance", "tenant-a");
        let downstream_id = downstream.id.clone();
        engine.ingest_alert(downstream).await;

        // Root-cause upstream alert arrives second
        let result = engine.ingest_alert(alert("data-layer", "tenant-a")).await;

        let group = result.expect("expected a correlation group");
        let root = group.root_cause.as_ref().expect("expected a root cause");
        assert!(root.is_root_cause);
        assert_eq!(group.related_alerts.len(), 1);
        assert_eq!(group.related_alerts[0].id, downstream_id);
        assert_eq!(
            group.related_alerts[0].correlated_group_id.as_deref(),
            Some(group.group_id.as_str())
        );
    }

    #[tokio::test]
    async fn test_downstream_after_root_cause_is_suppressed() {
        let engine = engine();

        let group = engine
            .ingest_alert(alert("data-layer", "tenant-a"))
            .await
            .expect("upstream registers a group");

        let result = engine.ingest_alert(alert("governance", "tenant-a")).await;
        assert!(result.is_none());

        let stored = engine.get_group(&group.group_id).await.unwrap();
        assert_eq!(stored.suppressed_count, 1);
        assert_eq!(
            stored.related_alerts[0].correlated_group_id.as_deref(),
            Some(group.group_id.as_str())
        );
    }

    #[tokio::test]
    async fn test_suppressed_count_matches_related_alerts() {
        let engine = engine();
        engine.ingest_alert(alert("data-layer", "tenant-a")).await;

        for service in ["governance", "model-registry", "finops"] {
            assert!(engine.ingest_alert(alert(service, "tenant-a")).await.is_none());
        }

        let groups = engine.get_active_groups().await;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].suppressed_count, 3);
        assert_eq!(groups[0].suppressed_count, groups[0].related_alerts.len());
    }

    #[tokio::test]
    async fn test_alert_outside_window_is_not_correlated() {
        let engine = AlertCorrelationEngine::new(graph()).with_window_seconds(30);

        // Downstream 60 seconds in the past, outside the 30s window but
        // still inside the 2x prune horizon
        let old = alert("governance", "tenant-a").with_timestamp(now() - Duration::seconds(60));
        engine.ingest_alert(old).await;

        let result = engine.ingest_alert(alert("data-layer", "tenant-a")).await;
        let group = result.unwrap();
        assert!(group.related_alerts.is_empty());
    }

    #[tokio::test]
    async fn test_alert_within_window_is_correlated() {
        let engine = engine();

        let recent = alert("governance", "tenant-a").with_timestamp(now() - Duration::seconds(30));
        engine.ingest_alert(recent).await;

        let result = engine.ingest_alert(alert("data-layer", "tenant-a")).await;
        assert_eq!(result.unwrap().related_alerts.len(), 1);
    }

    #[tokio::test]
    async fn test_window_boundary_is_subsecond_precise() {
        // Half a second past the 60s window: must not be correlated
        let engine = engine();
        let old = alert("governance", "tenant-a")
            .with_timestamp(now() - Duration::milliseconds(60_500));
        engine.ingest_alert(old).await;
        let group = engine.ingest_alert(alert("data-layer", "tenant-a")).await.unwrap();
        assert!(group.related_alerts.is_empty());

        // Half a second inside the window: correlated
        let engine = self::engine();
        let recent = alert("governance", "tenant-a")
            .with_timestamp(now() - Duration::milliseconds(59_500));
        engine.ingest_alert(recent).await;
        let group = engine.ingest_alert(alert("data-layer", "tenant-a")).await.unwrap();
        assert_eq!(group.related_alerts.len(), 1);
    }

    #[tokio::test]
    async fn test_tenant_isolation() {
        let engine = engine();

        engine.ingest_alert(alert("data-layer", "tenant-a")).await;

        // Same services, different tenant: must not be suppressed
        let result = engine.ingest_alert(alert("governance", "tenant-b")).await;
        let group = result.expect("tenant-b alert must not be suppressed");
        assert_eq!(group.tenant_id, "tenant-b");
        assert!(group.related_alerts.is_empty());
    }

    #[tokio::test]
    async fn test_tenants_hold_independent_groups() {
        let engine = engine();
        for tenant in ["tenant-a", "tenant-b"] {
            engine.ingest_alert(alert("data-layer", tenant)).await;
        }
        let stats = engine.get_statistics().await;
        assert_eq!(stats.active_groups, 2);
    }

    #[tokio::test]
    async fn test_transitive_downstream_is_suppressed() {
        let engine = engine();

        // platform-core → data-layer → governance is one transitive hop
        engine.ingest_alert(alert("platform-core", "tenant-a")).await;
        assert!(engine.ingest_alert(alert("governance", "tenant-a")).await.is_none());

        // No path from platform-core to this service
        assert!(engine.ingest_alert(alert("cron-runner", "tenant-a")).await.is_some());
    }

    #[tokio::test]
    async fn test_standalone_alert_is_not_registered() {
        let engine = engine();

        let result = engine.ingest_alert(alert("cron-runner", "tenant-a")).await;
        let group = result.unwrap();
        assert!(!group.root_cause.as_ref().unwrap().is_root_cause);

        let stats = engine.get_statistics().await;
        assert_eq!(stats.active_groups, 0);
        assert_eq!(stats.buffered_alerts, 1);
        assert!(engine.get_group(&group.group_id).await.is_none());
    }

    #[tokio::test]
    async fn test_statistics_empty_engine() {
        let stats = engine().get_statistics().await;
        assert_eq!(
            stats,
            CorrelationStats {
                active_groups: 0,
                buffered_alerts: 0,
                total_suppressed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_statistics_counts_suppressions() {
        let engine = engine();
        engine.ingest_alert(alert("governance", "tenant-a")).await;
        engine.ingest_alert(alert("data-layer", "tenant-a")).await;

        let stats = engine.get_statistics().await;
        assert_eq!(stats.active_groups, 1);
        assert_eq!(stats.total_suppressed, 1);
    }

    #[tokio::test]
    async fn test_reads_are_idempotent() {
        let engine = engine();
        engine.ingest_alert(alert("data-layer", "tenant-a")).await;

        assert_eq!(engine.get_statistics().await, engine.get_statistics().await);
        assert_eq!(
            engine.get_active_groups().await.len(),
            engine.get_active_groups().await.len()
        );
    }

    #[tokio::test]
    async fn test_get_group_unknown_id_is_none() {
        assert!(engine().get_group("no-such-group").await.is_none());
    }

    #[tokio::test]
    async fn test_stale_groups_are_pruned() {
        let engine = AlertCorrelationEngine::new(graph()).with_window_seconds(1);

        let group = engine
            .ingest_alert(alert("data-layer", "tenant-a"))
            .await
            .unwrap();

        // Wait past 2x the window, then trigger pruning with another ingest
        tokio::time::sleep(StdDuration::from_millis(2100)).await;
        engine.ingest_alert(alert("cron-runner", "tenant-a")).await;

        assert!(engine.get_group(&group.group_id).await.is_none());
        assert!(engine.get_active_groups().await.is_empty());
    }

    #[tokio::test]
    async fn test_buffer_hard_cap() {
        let engine = AlertCorrelationEngine::new(graph()).with_max_buffer_size(5);

        for i in 0..10 {
            engine.ingest_alert(alert("cron-runner", &format!("tenant-{i}"))).await;
        }

        // The cap is enforced at the start of each ingest, before the new
        // alert is appended
        let stats = engine.get_statistics().await;
        assert_eq!(stats.buffered_alerts, 6);
    }

    #[tokio::test]
    async fn test_concurrent_ingestion_is_serialized() {
        let engine = Arc::new(engine());

        let mut handles = Vec::new();
        for i in 0..20 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                engine.ingest_alert(alert("cron-runner", &format!("tenant-{i}"))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = engine.get_statistics().await;
        assert_eq!(stats.buffered_alerts, 20);
        assert_eq!(stats.active_groups, 0);
    }
}
