//! Work items of a resolution run.

use crate::coord::Coordinate;

/// A coordinate waiting for (another) lookup.
///
/// `layer_attempt` is the service layer the next fetch will query. It starts
/// at 0 and only ever grows, one step per requeue.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTask {
    /// Position of the coordinate in the caller's input.
    pub index: usize,
    /// The coordinate being resolved.
    pub coord: Coordinate,
    /// Layer to query on the next attempt.
    pub layer_attempt: u32,
}

impl CoordinateTask {
    /// Creates a fresh task at layer 0.
    pub fn new(index: usize, coord: Coordinate) -> Self {
        Self {
            index,
            coord,
            layer_attempt: 0,
        }
    }

    /// Consumes the task and returns it aimed at the next layer.
    pub fn next_layer(self) -> Self {
        Self {
            layer_attempt: self.layer_attempt + 1,
            ..self
        }
    }

    /// Number of fetches this task will have made once the current attempt
    /// completes.
    pub fn attempts_made(&self) -> u32 {
        self.layer_attempt + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_starts_at_layer_zero() {
        let task = CoordinateTask::new(3, Coordinate::new("1", "2"));
        assert_eq!(task.layer_attempt, 0);
        assert_eq!(task.index, 3);
        assert_eq!(task.attempts_made(), 1);
    }

    #[test]
    fn test_next_layer_increments_only_layer() {
        let task = CoordinateTask::new(3, Coordinate::new("1", "2"))
            .next_layer()
            .next_layer();
        assert_eq!(task.layer_attempt, 2);
        assert_eq!(task.index, 3);
        assert_eq!(task.coord, Coordinate::new("1", "2"));
    }
}
