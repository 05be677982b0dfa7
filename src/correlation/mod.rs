//! Alert Correlation Module
//!
//! Turns a stream of per-service alerts into a small number of incident
//! groups:
//! - Alert and correlation group types
//! - Static service dependency graph
//! - Deterministic rule-based correlation engine

pub mod alert;
pub mod engine;
pub mod graph;

pub use alert::{Alert, AlertSeverity, CorrelatedAlertGroup};
pub use engine::{AlertCorrelationEngine, CorrelationStats};
pub use graph::ServiceDependencyGraph;
