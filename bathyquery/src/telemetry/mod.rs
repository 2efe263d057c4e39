//! Resolution run telemetry.
//!
//! Lock-free counters recorded by the scheduler while it works, plus a
//! point-in-time snapshot for reporting.
//!
//! ```text
//! BatchScheduler ─────► ResolutionMetrics ─────► TelemetrySnapshot ─────► CLI summary
//!                       (atomic counters)        (plain copy)
//! ```

mod metrics;
mod snapshot;

pub use metrics::ResolutionMetrics;
pub use snapshot::TelemetrySnapshot;
