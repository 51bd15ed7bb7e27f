//! Loader telemetry for observability and user feedback.
//!
//! Metrics are collected with lock-free atomic counters so instrumentation
//! adds negligible overhead to the tile load path.
//!
//! # Architecture
//!
//! ```text
//! Loader / Cache ----> LoaderMetrics ----> TelemetrySnapshot ----> Views
//!                      (atomic counters)   (point-in-time copy)    (CLI, etc.)
//! ```

mod metrics;
mod snapshot;

pub use metrics::LoaderMetrics;
pub use snapshot::TelemetrySnapshot;
