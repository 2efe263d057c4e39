//! Attempt outcomes, terminal results and the retry decision.

use serde::Serialize;

use super::task::CoordinateTask;
use crate::coord::Coordinate;
use crate::provider::{FetchError, Feature};

/// What a single attempt produced.
///
/// Fetch errors are carried as a value instead of propagated so the retry
/// decision treats every kind of miss the same way.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The service answered; the list may be empty.
    Features(Vec<Feature>),
    /// The fetch failed.
    Failed(FetchError),
    /// The coordinate text could not be parsed; no fetch was made.
    Malformed,
}

impl AttemptOutcome {
    /// Features found by the attempt; empty for failures.
    pub fn into_features(self) -> Vec<Feature> {
        match self {
            AttemptOutcome::Features(features) => features,
            AttemptOutcome::Failed(_) | AttemptOutcome::Malformed => Vec::new(),
        }
    }
}

/// Terminal record for one input coordinate.
///
/// An empty `features` list means no data was found; it is a normal
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    /// Position of the coordinate in the caller's input.
    pub index: usize,
    /// The coordinate as supplied.
    pub coord: Coordinate,
    /// Features from the final attempt.
    pub features: Vec<Feature>,
    /// Fetches issued for this coordinate.
    pub attempts: u32,
    /// Layer queried by the final attempt, if any fetch was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<u32>,
}

impl ResolutionResult {
    /// Result for a coordinate that could not be parsed.
    pub fn malformed(task: CoordinateTask) -> Self {
        Self {
            index: task.index,
            coord: task.coord,
            features: Vec::new(),
            attempts: 0,
            layer: None,
        }
    }

    /// Whether any feature was found.
    pub fn has_data(&self) -> bool {
        !self.features.is_empty()
    }

    /// First numeric value of `field` among the features.
    pub fn depth(&self, field: &str) -> Option<f64> {
        self.features.iter().find_map(|f| f.number(field))
    }
}

/// What the scheduler does with a task after an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Put the task back, aimed at the next layer.
    Requeue(CoordinateTask),
    /// The coordinate is done.
    Complete(ResolutionResult),
}

/// Decides between retrying on the next layer and completing.
///
/// A task is requeued when the attempt found nothing and fewer than
/// `max_attempts` fetches have been made. Malformed coordinates are never
/// retried since no other layer can fix them.
pub fn decide(task: CoordinateTask, outcome: AttemptOutcome, max_attempts: u32) -> Decision {
    if outcome == AttemptOutcome::Malformed {
        return Decision::Complete(ResolutionResult::malformed(task));
    }

    let features = outcome.into_features();
    if features.is_empty() && task.attempts_made() < max_attempts {
        return Decision::Requeue(task.next_layer());
    }

    Decision::Complete(ResolutionResult {
        index: task.index,
        attempts: task.attempts_made(),
        layer: Some(task.layer_attempt),
        coord: task.coord,
        features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_at(layer: u32) -> CoordinateTask {
        let mut task = CoordinateTask::new(0, Coordinate::new("-2.21", "-47.43"));
        task.layer_attempt = layer;
        task
    }

    fn depth_feature() -> Feature {
        Feature::with_value("depth", 12.0)
    }

    #[test]
    fn test_features_complete_immediately() {
        match decide(task_at(0), AttemptOutcome::Features(vec![depth_feature()]), 5) {
            Decision::Complete(result) => {
                assert_eq!(result.features.len(), 1);
                assert_eq!(result.attempts, 1);
                assert_eq!(result.layer, Some(0));
                assert_eq!(result.depth("depth"), Some(12.0));
            }
            other => panic!("Expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_answer_requeues_next_layer() {
        match decide(task_at(0), AttemptOutcome::Features(Vec::new()), 5) {
            Decision::Requeue(task) => assert_eq!(task.layer_attempt, 1),
            other => panic!("Expected requeue, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_requeues_like_empty_answer() {
        let outcome = AttemptOutcome::Failed(FetchError::Api { status: 500 });
        match decide(task_at(2), outcome, 5) {
            Decision::Requeue(task) => assert_eq!(task.layer_attempt, 3),
            other => panic!("Expected requeue, got {:?}", other),
        }
    }

    #[test]
    fn test_last_layer_completes_empty() {
        let outcome = AttemptOutcome::Failed(FetchError::Network("reset".into()));
        match decide(task_at(4), outcome, 5) {
            Decision::Complete(result) => {
                assert!(!result.has_data());
                assert_eq!(result.attempts, 5);
                assert_eq!(result.layer, Some(4));
            }
            other => panic!("Expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_never_retried() {
        match decide(task_at(0), AttemptOutcome::Malformed, 5) {
            Decision::Complete(result) => {
                assert!(result.features.is_empty());
                assert_eq!(result.attempts, 0);
                assert_eq!(result.layer, None);
            }
            other => panic!("Expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_single_attempt_ceiling() {
        assert!(matches!(
            decide(task_at(0), AttemptOutcome::Features(Vec::new()), 1),
            Decision::Complete(_)
        ));
    }

    #[test]
    fn test_result_serializes_without_missing_layer() {
        let result = ResolutionResult::malformed(task_at(0));
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("layer").is_none());
        assert_eq!(json["coord"]["latitude"], "-2.21");
        assert_eq!(json["features"].as_array().unwrap().len(), 0);
    }
}
