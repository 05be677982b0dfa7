//! SLO Module
//!
//! Provides service-level-objective evaluation:
//! - SLO definition records
//! - Metric backend interface and evaluation windows
//! - Burn-rate engine with error-budget accounting

pub mod burn_rate;
pub mod definition;
pub mod metrics;

pub use burn_rate::{
    BurnRateResult, BurnRateWindow, MultiWindowBurnResult, SLOBurnRateEngine, SLOStatusSnapshot,
    WindowPair,
};
pub use definition::{SLODefinition, DEFAULT_FAST_BURN_THRESHOLD, DEFAULT_SLOW_BURN_THRESHOLD};
pub use metrics::{MetricQuery, QueryWindow, SLIResult};
