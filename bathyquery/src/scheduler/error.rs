//! Top-level scheduler failures.

use thiserror::Error;

/// Failure of a resolution run as a whole.
///
/// Per-coordinate problems never show up here; they end as results with no
/// features. These variants abort the run and discard partial results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The scheduler configuration cannot drive a run.
    #[error("Invalid scheduler configuration: {0}")]
    InvalidConfig(String),

    /// The run was cancelled before the queue drained.
    #[error("Resolution cancelled")]
    Cancelled,

    /// Unexpected internal failure during orchestration.
    #[error("Internal scheduler error: {0}")]
    Internal(String),
}
