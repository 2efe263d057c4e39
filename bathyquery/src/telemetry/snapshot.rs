//! Point-in-time copy of resolution counters.

use std::fmt;

/// Snapshot of [`ResolutionMetrics`](super::ResolutionMetrics).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Batches dequeued.
    pub batches: u64,
    /// Fetches issued.
    pub attempts: u64,
    /// Fetches answered with a non-success status.
    pub api_errors: u64,
    /// Fetches that failed in transport.
    pub network_errors: u64,
    /// Fetches with an undecodable body.
    pub invalid_responses: u64,
    /// Tasks put back on the queue with the next layer.
    pub requeued: u64,
    /// Coordinates that ended with features.
    pub resolved: u64,
    /// Coordinates that ran out of layers.
    pub exhausted: u64,
    /// Coordinates that could not be parsed.
    pub malformed: u64,
}

impl TelemetrySnapshot {
    /// Coordinates that reached a terminal result.
    pub fn completed(&self) -> u64 {
        self.resolved + self.exhausted + self.malformed
    }

    /// Fetches that ended in any error.
    pub fn failed_attempts(&self) -> u64 {
        self.api_errors + self.network_errors + self.invalid_responses
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} resolved, {} no data, {} malformed ({} requests in {} batches, {} failed)",
            self.resolved,
            self.exhausted,
            self.malformed,
            self.attempts,
            self.batches,
            self.failed_attempts()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_summary() {
        let snapshot = TelemetrySnapshot {
            batches: 2,
            attempts: 7,
            api_errors: 1,
            network_errors: 1,
            resolved: 3,
            exhausted: 1,
            malformed: 1,
            ..Default::default()
        };
        assert_eq!(
            snapshot.to_string(),
            "3 resolved, 1 no data, 1 malformed (7 requests in 2 batches, 2 failed)"
        );
    }
}
