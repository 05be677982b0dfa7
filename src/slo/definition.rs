//! SLO definition records.
//!
//! The read-only input shape supplied by the external persistence layer.

use serde::{Deserialize, Serialize};

/// Default fast-burn alert threshold: 2% of a 30-day budget in one hour.
pub const DEFAULT_FAST_BURN_THRESHOLD: f64 = 14.4;

/// Default slow-burn alert threshold: 5% of a 30-day budget in six hours.
pub const DEFAULT_SLOW_BURN_THRESHOLD: f64 = 6.0;

/// A service-level objective definition.
///
/// The numerator and denominator queries resolve externally to a count of
/// "good" and "total" events over a given window; the engine never
/// interprets the query syntax.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SLODefinition {
    /// Definition identifier, used for logging and result attribution
    pub slo_id: String,
    /// Service the SLO tracks
    pub service_name: String,
    /// Query for good events (e.g. successful requests)
    pub numerator_query: String,
    /// Query for total events
    pub denominator_query: String,
    /// Objective as a percentage (e.g. 99.9 for three nines)
    pub target_percentage: f64,
    /// Rolling error-budget window in days
    pub window_days: u32,
    /// Burn-rate multiplier that triggers a fast-burn alert
    pub fast_burn_threshold: f64,
    /// Burn-rate multiplier that triggers a slow-burn alert
    pub slow_burn_threshold: f64,
}

impl SLODefinition {
    /// Create a definition with a 30-day window and the standard SRE
    /// burn thresholds.
    pub fn new(
        slo_id: &str,
        service_name: &str,
        numerator_query: &str,
        denominator_query: &str,
        target_percentage: f64,
    ) -> Self {
        Self {
            slo_id: slo_id.to_string(),
            service_name: service_name.to_string(),
            numerator_query: numerator_query.to_string(),
            denominator_query: denominator_query.to_string(),
            target_percentage,
            window_days: 30,
            fast_burn_threshold: DEFAULT_FAST_BURN_THRESHOLD,
            slow_burn_threshold: DEFAULT_SLOW_BURN_THRESHOLD,
        }
    }

    /// Set the rolling window length in days.
    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }

    /// Set the burn thresholds.
    pub fn with_thresholds(mut self, fast: f64, slow: f64) -> Self {
        self.fast_burn_threshold = fast;
        self.slow_burn_threshold = slow;
        self
    }

    /// Allowed error fraction: `1 - target / 100`. A 99.9% target leaves a
    /// 0.001 budget fraction.
    pub fn error_budget_fraction(&self) -> f64 {
        1.0 - self.target_percentage / 100.0
    }

    /// Total error budget in minutes over the rolling window.
    pub fn total_error_budget_minutes(&self) -> f64 {
        f64::from(self.window_days) * 24.0 * 60.0 * self.error_budget_fraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> SLODefinition {
        SLODefinition::new(
            "slo-checkout",
            "checkout",
            "sum(rate(http_requests_total{code!~\"5..\"}[5m]))",
            "sum(rate(http_requests_total[5m]))",
            99.9,
        )
    }

    #[test]
    fn test_defaults() {
        let def = definition();
        assert_eq!(def.window_days, 30);
        assert_eq!(def.fast_burn_threshold, DEFAULT_FAST_BURN_THRESHOLD);
        assert_eq!(def.slow_burn_threshold, DEFAULT_SLOW_BURN_THRESHOLD);
    }

    #[test]
    fn test_error_budget_fraction() {
        let def = definition();
        assert!((def.error_budget_fraction() - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_total_error_budget_minutes() {
        // 30 days * 1440 minutes * 0.001 = 43.2 minutes
        let def = definition();
        assert!((def.total_error_budget_minutes() - 43.2).abs() < 1e-9);
    }

    #[test]
    fn test_builders() {
        let def = definition().with_window_days(7).with_thresholds(10.0, 2.0);
        assert_eq!(def.window_days, 7);
        assert_eq!(def.fast_burn_threshold, 10.0);
        assert_eq!(def.slow_burn_threshold, 2.0);
    }
}
