//! Atomic counters for a resolution run.

use std::sync::atomic::{AtomicU64, Ordering};

use super::snapshot::TelemetrySnapshot;
use crate::provider::FetchError;

/// Counters updated by the scheduler.
///
/// All methods take `&self`; share behind an `Arc` to read from another
/// task while a run is in progress.
#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    batches: AtomicU64,
    attempts: AtomicU64,
    api_errors: AtomicU64,
    network_errors: AtomicU64,
    invalid_responses: AtomicU64,
    requeued: AtomicU64,
    resolved: AtomicU64,
    exhausted: AtomicU64,
    malformed: AtomicU64,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_started(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn attempt_issued(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed fetch under its error kind.
    pub fn attempt_failed(&self, error: &FetchError) {
        let counter = match error {
            FetchError::Api { .. } => &self.api_errors,
            FetchError::Network(_) => &self.network_errors,
            FetchError::InvalidResponse(_) => &self.invalid_responses,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requeued(&self) {
        self.requeued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn resolved(&self) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of all counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            api_errors: self.api_errors.load(Ordering::Relaxed),
            network_errors: self.network_errors.load(Ordering::Relaxed),
            invalid_responses: self.invalid_responses.load(Ordering::Relaxed),
            requeued: self.requeued.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        assert_eq!(ResolutionMetrics::new().snapshot(), TelemetrySnapshot::default());
    }

    #[test]
    fn test_failures_are_counted_by_kind() {
        let metrics = ResolutionMetrics::new();
        metrics.attempt_failed(&FetchError::Api { status: 500 });
        metrics.attempt_failed(&FetchError::Api { status: 404 });
        metrics.attempt_failed(&FetchError::Network("reset".into()));
        metrics.attempt_failed(&FetchError::InvalidResponse("eof".into()));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.api_errors, 2);
        assert_eq!(snapshot.network_errors, 1);
        assert_eq!(snapshot.invalid_responses, 1);
        assert_eq!(snapshot.failed_attempts(), 4);
    }

    #[test]
    fn test_terminal_counters() {
        let metrics = ResolutionMetrics::new();
        metrics.resolved();
        metrics.resolved();
        metrics.exhausted();
        metrics.malformed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.completed(), 4);
        assert_eq!(snapshot.resolved, 2);
    }
}
