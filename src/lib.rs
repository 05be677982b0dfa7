//! # vigil — observability decision core
//!
//! The decision layer of a multi-tenant observability stack:
//! - **Alert correlation**: deterministic, graph-based suppression of
//!   duplicate and downstream alerts sharing a root cause
//! - **SLO burn rate**: multi-window, multi-threshold error-budget
//!   evaluation following the Google SRE model
//!
//! Everything around these engines — metric ingestion, dashboards,
//! persistence, HTTP routing, tenant auth — is a collaborator supplied by
//! the host service.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vigil::correlation::{Alert, AlertCorrelationEngine, AlertSeverity, ServiceDependencyGraph};
//!
//! #[tokio::main]
//! async fn main() {
//!     let graph = Arc::new(
//!         ServiceDependencyGraph::new().with_service("data-layer", ["api", "billing"]),
//!     );
//!     let engine = AlertCorrelationEngine::new(graph);
//!
//!     let alert = Alert::new("data-layer", "tenant-a", AlertSeverity::Critical, "primary down");
//!     if let Some(group) = engine.ingest_alert(alert).await {
//!         println!("incident group: {}", group.group_id);
//!     }
//! }
//! ```

pub mod core;
pub mod correlation;
pub mod slo;

pub use crate::core::error::{Error, Result};

/// Install a global `tracing` subscriber with env-filter support.
///
/// Convenience for binaries embedding the engines; library consumers that
/// already configure tracing should skip this. Calling it twice is a no-op.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
