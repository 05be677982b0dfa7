//! Metric backend interface and evaluation windows.
//!
//! The burn-rate engine never talks to a time-series database directly; it
//! consumes scalars resolved by a [`MetricQuery`] collaborator.

use crate::core::{Result, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An evaluation window for a metric query, stored in minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryWindow {
    minutes: u64,
}

impl QueryWindow {
    /// Standard fast-burn short window (5 minutes).
    pub const FAST_5M: QueryWindow = QueryWindow::minutes(5);
    /// Standard fast-burn long window (1 hour).
    pub const SLOW_1H: QueryWindow = QueryWindow::hours(1);
    /// Standard slow-burn short window (6 hours).
    pub const MEDIUM_6H: QueryWindow = QueryWindow::hours(6);
    /// Standard slow-burn long window (3 days).
    pub const LONG_3D: QueryWindow = QueryWindow::days(3);

    /// Window of `n` minutes.
    pub const fn minutes(n: u64) -> Self {
        Self { minutes: n }
    }

    /// Window of `n` hours.
    pub const fn hours(n: u64) -> Self {
        Self { minutes: n * 60 }
    }

    /// Window of `n` days.
    pub const fn days(n: u64) -> Self {
        Self { minutes: n * 24 * 60 }
    }

    /// Window length in minutes.
    pub const fn as_minutes(&self) -> u64 {
        self.minutes
    }

    /// Canonical window label in the largest whole unit: `5m`, `6h`, `3d`.
    pub fn label(&self) -> String {
        if self.minutes > 0 && self.minutes % (24 * 60) == 0 {
            format!("{}d", self.minutes / (24 * 60))
        } else if self.minutes > 0 && self.minutes % 60 == 0 {
            format!("{}h", self.minutes / 60)
        } else {
            format!("{}m", self.minutes)
        }
    }
}

impl std::fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// External metric-query backend.
///
/// Implementations resolve a query expression to a scalar as of now over
/// the given window, typically against Prometheus. Failures are reported
/// as errors; the engines catch them and substitute zero counts rather
/// than propagating.
#[async_trait]
pub trait MetricQuery: Send + Sync {
    /// Resolve a query expression to a scalar value over the window.
    async fn query_scalar(&self, expression: &str, window: QueryWindow) -> Result<f64>;
}

/// Result of a single service-level-indicator computation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SLIResult {
    /// Good events / total events, in [0, 1]. 1.0 when no traffic was
    /// observed.
    pub value: f64,
    /// Count of good events in the window
    pub good_events: f64,
    /// Count of total events in the window
    pub total_events: f64,
    /// Evaluation window label (e.g. `5m`, `30d`)
    pub window: String,
    /// UTC instant of computation
    pub computed_at: Timestamp,
}

impl SLIResult {
    /// Observed error rate: `1 - value`.
    pub fn error_rate(&self) -> f64 {
        1.0 - self.value
    }
}
