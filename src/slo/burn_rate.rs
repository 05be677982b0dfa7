//! SLO burn-rate calculation engine.
//!
//! Implements Google SRE multi-window burn-rate alerting:
//! - Fast pairing (5m + 1h): catches rapid error-budget exhaustion
//! - Slow pairing (6h + 3d): catches gradual erosion the fast pair misses
//!
//! The formula: `burn_rate = error_rate / (1 - slo_target)`. A burn rate of
//! 1.0 consumes the budget exactly at the end of the rolling SLO window.
//! An alert fires only when both halves of a pairing exceed their threshold
//! simultaneously; that is the alerting contract, not optional smoothing.

use crate::core::{now, Timestamp};
use crate::slo::definition::SLODefinition;
use crate::slo::metrics::{MetricQuery, QueryWindow, SLIResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Burn-rate evaluation for a single time window.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BurnRateWindow {
    /// Window label (`5m`, `1h`, ...)
    pub window: String,
    /// Observed burn-rate multiplier (1.0 = nominal)
    pub burn_rate: f64,
    /// Alert threshold for this window
    pub threshold: f64,
    /// True if `burn_rate >= threshold`
    pub is_burning: bool,
    /// Raw error rate observed in this window
    pub error_rate: f64,
    /// SLO target percentage used in the calculation
    pub slo_target: f64,
}

/// A short/long window pairing for one severity class.
///
/// The pairing alerts only when both halves burn simultaneously, which
/// filters transient spikes without reacting too slowly to real outages.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WindowPair {
    /// Short-window evaluation
    pub short: BurnRateWindow,
    /// Long-window evaluation
    pub long: BurnRateWindow,
    /// True if both halves are burning
    pub is_alerting: bool,
}

/// Result of multi-window multi-burn-rate SLO evaluation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiWindowBurnResult {
    /// SLO definition identifier
    pub slo_id: String,
    /// Fast pairing: 5m + 1h against the fast-burn threshold
    pub fast: WindowPair,
    /// Slow pairing: 6h + 3d against the slow-burn threshold
    pub slow: WindowPair,
    /// True if either pairing is alerting
    pub is_alerting: bool,
    /// UTC instant of evaluation
    pub evaluated_at: Timestamp,
}

/// Result of a single SLO burn-rate evaluation with budget accounting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BurnRateResult {
    /// SLO definition identifier
    pub slo_id: String,
    /// SLO target percentage
    pub target_percentage: f64,
    /// Rolling window length in days
    pub window_days: u32,

    /// Total error budget in minutes over the rolling window
    pub total_error_budget_minutes: f64,
    /// Remaining error budget in minutes, in [0, total]
    pub current_error_budget_minutes: f64,
    /// Consumed fraction of the budget, in [0, 100]
    pub error_budget_consumed_percentage: f64,

    /// Burn rate over the fast evaluation window
    pub fast_burn_rate: f64,
    /// Burn rate over the slow evaluation window
    pub slow_burn_rate: f64,
    /// Fast-burn alert threshold
    pub fast_burn_threshold: f64,
    /// Slow-burn alert threshold
    pub slow_burn_threshold: f64,

    /// True if the fast window meets its threshold
    pub is_fast_burning: bool,
    /// True if the slow window meets its threshold
    pub is_slow_burning: bool,

    /// UTC instant of computation
    pub calculated_at: Timestamp,
}

/// Complete SLO status for dashboard display.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SLOStatusSnapshot {
    /// SLO definition identifier
    pub slo_id: String,
    /// Service the SLO tracks
    pub service_name: String,
    /// SLO objective percentage
    pub target_percentage: f64,
    /// Observed availability over the full window, as a percentage
    pub current_availability: f64,
    /// True if `current_availability >= target_percentage`
    pub is_meeting_slo: bool,
    /// Compliance window length in days
    pub window_days: u32,
    /// Remaining budget as a percentage, floored at 0
    pub compliance_percentage: f64,
    /// Latest burn-rate evaluation with budget accounting
    pub burn: BurnRateResult,
    /// Latest multi-window pairing evaluation; `multi_window.is_alerting`
    /// is the verdict to page on, not the per-window booleans in `burn`
    pub multi_window: MultiWindowBurnResult,
    /// Full-window SLI computation
    pub sli: SLIResult,
}

/// SLO burn-rate engine.
///
/// Stateless across calls: each evaluation issues its own metric-backend
/// queries and returns a fresh result, so concurrent evaluations need no
/// shared mutable state. Backend failures degrade to "no error observed"
/// rather than paging on flakiness.
pub struct SLOBurnRateEngine {
    backend: Arc<dyn MetricQuery>,
}

impl SLOBurnRateEngine {
    /// Create an engine over a metric-query backend.
    pub fn new(backend: Arc<dyn MetricQuery>) -> Self {
        Self { backend }
    }

    /// Compute a service-level indicator over one window.
    ///
    /// Resolves the numerator and denominator queries concurrently. If
    /// either query fails or returns a non-finite scalar, the whole window
    /// degrades to zero counts so a half-resolved ratio can never report a
    /// phantom error rate. Zero total traffic yields an SLI of 1.0.
    pub async fn compute_sli(
        &self,
        slo_id: &str,
        numerator_query: &str,
        denominator_query: &str,
        window: QueryWindow,
    ) -> SLIResult {
        let (good, total) = futures::future::join(
            self.backend.query_scalar(numerator_query, window),
            self.backend.query_scalar(denominator_query, window),
        )
        .await;

        let (good_events, total_events) = match (good, total) {
            (Ok(good), Ok(total)) if good.is_finite() && total.is_finite() => (good, total),
            (good, total) => {
                let reason = good
                    .err()
                    .or(total.err())
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "non-finite scalar".to_string());
                warn!(
                    slo_id,
                    window = %window,
                    reason = %reason,
                    "metric query degraded, treating window as no traffic"
                );
                (0.0, 0.0)
            }
        };

        let value = if total_events > 0.0 {
            good_events / total_events
        } else {
            1.0
        };

        debug!(
            slo_id,
            window = %window,
            value,
            good_events,
            total_events,
            "SLI computed"
        );

        SLIResult {
            value,
            good_events,
            total_events,
            window: window.label(),
            computed_at: now(),
        }
    }

    /// Evaluate the burn rate for a single window against a threshold.
    pub async fn burn_rate_for_window(
        &self,
        definition: &SLODefinition,
        window: QueryWindow,
        threshold: f64,
    ) -> BurnRateWindow {
        let sli = self
            .compute_sli(
                &definition.slo_id,
                &definition.numerator_query,
                &definition.denominator_query,
                window,
            )
            .await;

        let error_rate = sli.error_rate();
        let budget_fraction = definition.error_budget_fraction();
        // Zero budget fraction means a 100% target; burn rate is undefined
        // there, so report 0 instead of dividing by zero
        let burn_rate = if budget_fraction > 0.0 {
            error_rate / budget_fraction
        } else {
            0.0
        };

        BurnRateWindow {
            window: window.label(),
            burn_rate,
            threshold,
            is_burning: burn_rate >= threshold,
            error_rate,
            slo_target: definition.target_percentage,
        }
    }

    /// Calculate the burn rate for one SLO using the default evaluation
    /// windows (fast = 5 minutes, slow = 60 minutes).
    pub async fn calculate(&self, definition: &SLODefinition) -> BurnRateResult {
        self.calculate_with_windows(definition, QueryWindow::FAST_5M, QueryWindow::SLOW_1H)
            .await
    }

    /// Calculate the burn rate for one SLO with explicit evaluation windows.
    ///
    /// The per-window booleans are the per-window half of the multi-window
    /// pairing; callers combine them (or use
    /// [`evaluate_multi_window`](Self::evaluate_multi_window)) before paging.
    pub async fn calculate_with_windows(
        &self,
        definition: &SLODefinition,
        fast_window: QueryWindow,
        slow_window: QueryWindow,
    ) -> BurnRateResult {
        let fast = self
            .burn_rate_for_window(definition, fast_window, definition.fast_burn_threshold)
            .await;
        let slow = self
            .burn_rate_for_window(definition, slow_window, definition.slow_burn_threshold)
            .await;

        debug!(
            slo_id = %definition.slo_id,
            fast_error_rate = fast.error_rate,
            slow_error_rate = slow.error_rate,
            target = definition.target_percentage,
            "SLO error rates"
        );

        let total_error_budget_minutes = definition.total_error_budget_minutes();
        let window_total_minutes = f64::from(definition.window_days) * 24.0 * 60.0;

        // The slow window is the more representative rate for long-horizon
        // budget accounting
        let consumed_fraction = (slow.burn_rate
            * (slow_window.as_minutes() as f64 / window_total_minutes))
            .clamp(0.0, 1.0);
        let current_error_budget_minutes =
            (total_error_budget_minutes * (1.0 - consumed_fraction)).max(0.0);

        BurnRateResult {
            slo_id: definition.slo_id.clone(),
            target_percentage: definition.target_percentage,
            window_days: definition.window_days,
            total_error_budget_minutes,
            current_error_budget_minutes,
            error_budget_consumed_percentage: consumed_fraction * 100.0,
            fast_burn_rate: fast.burn_rate,
            slow_burn_rate: slow.burn_rate,
            fast_burn_threshold: definition.fast_burn_threshold,
            slow_burn_threshold: definition.slow_burn_threshold,
            is_fast_burning: fast.is_burning,
            is_slow_burning: slow.is_burning,
            calculated_at: now(),
        }
    }

    /// Evaluate an SLO with multi-window multi-burn-rate alerting.
    ///
    /// The fast pairing tests the 5-minute and 1-hour windows against the
    /// fast-burn threshold; the slow pairing tests the 6-hour and 3-day
    /// windows against the slow-burn threshold. A pairing alerts only when
    /// both of its halves burn simultaneously.
    pub async fn evaluate_multi_window(&self, definition: &SLODefinition) -> MultiWindowBurnResult {
        let fast = self
            .window_pair(
                definition,
                QueryWindow::FAST_5M,
                QueryWindow::SLOW_1H,
                definition.fast_burn_threshold,
            )
            .await;
        let slow = self
            .window_pair(
                definition,
                QueryWindow::MEDIUM_6H,
                QueryWindow::LONG_3D,
                definition.slow_burn_threshold,
            )
            .await;

        let is_alerting = fast.is_alerting || slow.is_alerting;

        info!(
            slo_id = %definition.slo_id,
            short_burn = fast.short.burn_rate,
            long_burn = fast.long.burn_rate,
            is_alerting,
            "multi-window SLO evaluated"
        );

        MultiWindowBurnResult {
            slo_id: definition.slo_id.clone(),
            fast,
            slow,
            is_alerting,
            evaluated_at: now(),
        }
    }

    async fn window_pair(
        &self,
        definition: &SLODefinition,
        short: QueryWindow,
        long: QueryWindow,
        threshold: f64,
    ) -> WindowPair {
        let short = self.burn_rate_for_window(definition, short, threshold).await;
        let long = self.burn_rate_for_window(definition, long, threshold).await;
        let is_alerting = short.is_burning && long.is_burning;
        WindowPair {
            short,
            long,
            is_alerting,
        }
    }

    /// Compute a complete SLO status snapshot for dashboard display.
    ///
    /// The availability figure comes from a separate full-window SLI
    /// computation over `window_days`; it is not part of the burn-rate math.
    pub async fn slo_status(&self, definition: &SLODefinition) -> SLOStatusSnapshot {
        let sli = self
            .compute_sli(
                &definition.slo_id,
                &definition.numerator_query,
                &definition.denominator_query,
                QueryWindow::days(u64::from(definition.window_days)),
            )
            .await;
        let burn = self.calculate(definition).await;
        let multi_window = self.evaluate_multi_window(definition).await;

        let current_availability = sli.value * 100.0;
        let compliance_percentage = (100.0 - burn.error_budget_consumed_percentage).max(0.0);

        SLOStatusSnapshot {
            slo_id: definition.slo_id.clone(),
            service_name: definition.service_name.clone(),
            target_percentage: definition.target_percentage,
            current_availability,
            is_meeting_slo: current_availability >= definition.target_percentage,
            window_days: definition.window_days,
            compliance_percentage,
            burn,
            multi_window,
            sli,
        }
    }

    /// Evaluate a batch of SLO definitions sequentially, one snapshot per
    /// definition. Intended for a polling caller evaluating every active
    /// SLO of a tenant.
    pub async fn evaluate_batch(&self, definitions: &[SLODefinition]) -> Vec<SLOStatusSnapshot> {
        let mut snapshots = Vec::with_capacity(definitions.len());
        for definition in definitions {
            snapshots.push(self.slo_status(definition).await);
        }
        snapshots
    }
}
