//! Alert and correlation group data types.

use crate::core::{new_id, now, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Alert severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Critical fault
    Critical,
    /// Warning
    Warning,
    /// Informational
    Info,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Critical => write!(f, "critical"),
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Info => write!(f, "info"),
        }
    }
}

/// A single alert reported by any service in the platform.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert identifier, generated at construction
    pub id: String,
    /// Service that emitted the alert
    pub service_name: String,
    /// Tenant the alert belongs to
    pub tenant_id: String,
    /// Severity level
    pub severity: AlertSeverity,
    /// Human-readable description
    pub message: String,
    /// UTC instant the alert was observed
    pub timestamp: Timestamp,
    /// Arbitrary key/value labels for routing and filtering
    pub labels: HashMap<String, String>,
    /// Set once this alert becomes the anchor of a correlation group
    pub is_root_cause: bool,
    /// Group the alert is attached to (as root or suppressed child), if any.
    /// Once set it is never cleared.
    pub correlated_group_id: Option<String>,
}

impl Alert {
    /// Create a new alert observed now.
    pub fn new(service_name: &str, tenant_id: &str, severity: AlertSeverity, message: &str) -> Self {
        Self {
            id: new_id(),
            service_name: service_name.to_string(),
            tenant_id: tenant_id.to_string(),
            severity,
            message: message.to_string(),
            timestamp: now(),
            labels: HashMap::new(),
            is_root_cause: false,
            correlated_group_id: None,
        }
    }

    /// Override the observation timestamp.
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Add a label.
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }
}

/// A group of correlated alerts sharing one inferred incident.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrelatedAlertGroup {
    /// Unique group identifier
    pub group_id: String,
    /// The anchor alert, or None for a placeholder registered before
    /// any downstream alert arrived
    pub root_cause: Option<Alert>,
    /// Downstream alerts suppressed by this group, in arrival order
    pub related_alerts: Vec<Alert>,
    /// Tenant scope; equals the tenant of every alert in the group
    pub tenant_id: String,
    /// UTC instant the group was created, used for pruning
    pub started_at: Timestamp,
    /// Number of child alerts suppressed so far; always equals
    /// `related_alerts.len()`
    pub suppressed_count: usize,
}

impl CorrelatedAlertGroup {
    /// Create a group anchored on a root-cause alert.
    pub fn new(root_cause: Alert, related_alerts: Vec<Alert>) -> Self {
        let tenant_id = root_cause.tenant_id.clone();
        let suppressed_count = related_alerts.len();
        Self {
            group_id: new_id(),
            root_cause: Some(root_cause),
            related_alerts,
            tenant_id,
            started_at: now(),
            suppressed_count,
        }
    }

    /// Append a suppressed child alert.
    pub fn suppress(&mut self, alert: Alert) {
        self.related_alerts.push(alert);
        self.suppressed_count += 1;
    }

    /// Total number of alerts in the group, root cause included.
    pub fn alert_count(&self) -> usize {
        self.related_alerts.len() + usize::from(self.root_cause.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_creation() {
        let alert = Alert::new("checkout", "tenant-a", AlertSeverity::Critical, "db down")
            .with_label("region", "eu-west-1");

        assert_eq!(alert.service_name, "checkout");
        assert_eq!(alert.tenant_id, "tenant-a");
        assert_eq!(alert.labels.get("region").map(String::as_str), Some("eu-west-1"));
        assert!(!alert.is_root_cause);
        assert!(alert.correlated_group_id.is_none());
    }

    #[test]
    fn test_alert_ids_are_unique() {
        let a = Alert::new("svc", "t", AlertSeverity::Info, "m");
        let b = Alert::new("svc", "t", AlertSeverity::Info, "m");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(AlertSeverity::Critical.to_string(), "critical");
        assert_eq!(AlertSeverity::Warning.to_string(), "warning");
        assert_eq!(AlertSeverity::Info.to_string(), "info");
    }

    #[test]
    fn test_group_suppress_bookkeeping() {
        let root = Alert::new("db", "tenant-a", AlertSeverity::Critical, "primary down");
        let mut group = CorrelatedAlertGroup::new(root, Vec::new());

        assert_eq!(group.suppressed_count, 0);
        assert_eq!(group.alert_count(), 1);

        group.suppress(Alert::new("api", "tenant-a", AlertSeverity::Warning, "5xx spike"));
        assert_eq!(group.suppressed_count, 1);
        assert_eq!(group.suppressed_count, group.related_alerts.len());
        assert_eq!(group.alert_count(), 2);
    }

    #[test]
    fn test_group_serializes() {
        let root = Alert::new("db", "tenant-a", AlertSeverity::Critical, "primary down");
        let group = CorrelatedAlertGroup::new(root, Vec::new());
        let json = serde_json::to_string(&group).unwrap();
        assert!(json.contains("\"severity\":\"critical\""));
    }
}
