//! Batched, rate-limited, layer-falling-back depth resolution.
//!
//! The scheduler turns a list of coordinates into exactly one
//! [`ResolutionResult`] per coordinate. It works from a single queue:
//!
//! ```text
//!            ┌──────────── requeue (layer + 1) ────────────┐
//!            ▼                                             │
//! queue ──► batch (≤ batch_size) ──► attempts (≤ concurrency in flight)
//!                                         │ join
//!                                         ▼
//!                                  decide ──► results
//!                                         │
//!                                         ▼
//!                            sleep(inter_batch_delay) if queue not empty
//! ```
//!
//! All queue mutation happens in the orchestrating future between joins.
//! Attempts only return an [`AttemptOutcome`]; they never touch shared state
//! beyond the lock-free metrics.
//!
//! # Example
//!
//! ```ignore
//! use bathyquery::scheduler::{BatchScheduler, SchedulerConfig};
//!
//! let scheduler = BatchScheduler::new(source, SchedulerConfig::default())?;
//! let results = scheduler.resolve(coords).await?;
//! ```

mod config;
mod error;
mod outcome;
mod task;

pub use config::{
    RequeuePolicy, SchedulerConfig, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RATE_LIMIT_PER_MINUTE,
};
pub use error::SchedulerError;
pub use outcome::{decide, AttemptOutcome, Decision, ResolutionResult};
pub use task::CoordinateTask;

use std::collections::VecDeque;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::coord::{parse_decimal, Coordinate};
use crate::projection::to_envelope;
use crate::provider::DepthSource;
use crate::telemetry::ResolutionMetrics;

/// Callback invoked once per terminal result, in completion order.
pub type ProgressCallback = Arc<dyn Fn(&ResolutionResult) + Send + Sync>;

/// Resolves coordinates to depth features against a [`DepthSource`].
pub struct BatchScheduler<S: DepthSource> {
    source: S,
    config: SchedulerConfig,
    metrics: Arc<ResolutionMetrics>,
    progress: Option<ProgressCallback>,
}

impl<S: DepthSource> BatchScheduler<S> {
    /// Creates a scheduler, rejecting configurations that cannot run.
    pub fn new(source: S, config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            metrics: Arc::new(ResolutionMetrics::new()),
            progress: None,
        })
    }

    /// Registers a callback for each terminal result.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Records into the given metrics instead of a private one.
    pub fn with_metrics(mut self, metrics: Arc<ResolutionMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn metrics(&self) -> Arc<ResolutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Resolves every coordinate.
    ///
    /// Same as [`resolve_with_cancellation`](Self::resolve_with_cancellation)
    /// with a token that is never cancelled.
    pub async fn resolve(
        &self,
        coords: Vec<Coordinate>,
    ) -> Result<Vec<ResolutionResult>, SchedulerError> {
        self.resolve_with_cancellation(coords, CancellationToken::new())
            .await
    }

    /// Resolves every coordinate, stopping early if `cancel` fires.
    ///
    /// Returns one result per input coordinate. Output order follows
    /// completion, not input; use [`ResolutionResult::index`] to match
    /// results back to inputs.
    ///
    /// Cancellation is observed before each batch and during the
    /// inter-batch delay. A batch already in flight runs to completion.
    /// A cancelled run returns [`SchedulerError::Cancelled`] and discards
    /// partial results.
    pub async fn resolve_with_cancellation(
        &self,
        coords: Vec<Coordinate>,
        cancel: CancellationToken,
    ) -> Result<Vec<ResolutionResult>, SchedulerError> {
        let mut queue: VecDeque<CoordinateTask> = coords
            .into_iter()
            .enumerate()
            .map(|(index, coord)| CoordinateTask::new(index, coord))
            .collect();
        let mut results = Vec::with_capacity(queue.len());
        let delay = self.config.inter_batch_delay();
        let limiter = Semaphore::new(self.config.concurrency);
        let mut batch_number: u64 = 0;

        info!(
            coordinates = queue.len(),
            source = self.source.name(),
            batch_size = self.config.batch_size,
            concurrency = self.config.concurrency,
            delay_ms = delay.as_millis() as u64,
            "Starting depth resolution"
        );

        while !queue.is_empty() {
            if cancel.is_cancelled() {
                warn!(pending = queue.len(), "Depth resolution cancelled");
                return Err(SchedulerError::Cancelled);
            }

            let take = self.config.batch_size.min(queue.len());
            let batch: Vec<CoordinateTask> = queue.drain(..take).collect();
            batch_number += 1;
            self.metrics.batch_started();
            debug!(
                batch = batch_number,
                size = batch.len(),
                queued = queue.len(),
                "Dispatching batch"
            );

            let attempts = batch.into_iter().map(|task| self.attempt(task, &limiter));
            let outcomes = join_all(attempts)
                .await
                .into_iter()
                .collect::<Result<Vec<_>, _>>()?;

            let mut retries = Vec::new();
            for (task, outcome) in outcomes {
                match decide(task, outcome, self.config.max_attempts) {
                    Decision::Requeue(next) => {
                        self.metrics.requeued();
                        retries.push(next);
                    }
                    Decision::Complete(result) => {
                        self.complete(&result);
                        results.push(result);
                    }
                }
            }
            self.requeue(&mut queue, retries);

            if !queue.is_empty() {
                debug!(
                    delay_ms = delay.as_millis() as u64,
                    queued = queue.len(),
                    "Waiting for rate limit"
                );
                tokio::select! {
                    _ = cancel.cancelled() => {
                        warn!(pending = queue.len(), "Depth resolution cancelled");
                        return Err(SchedulerError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        info!(summary = %self.metrics.snapshot(), "Depth resolution complete");
        Ok(results)
    }

    /// Runs one attempt for a task.
    ///
    /// Parsing happens before a concurrency permit is taken, so malformed
    /// coordinates never occupy a fetch slot.
    async fn attempt(
        &self,
        task: CoordinateTask,
        limiter: &Semaphore,
    ) -> Result<(CoordinateTask, AttemptOutcome), SchedulerError> {
        let parsed = (
            parse_decimal(&task.coord.latitude),
            parse_decimal(&task.coord.longitude),
        );
        let (lat, lon) = match parsed {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                debug!(coord = %task.coord, "Coordinate could not be parsed");
                return Ok((task, AttemptOutcome::Malformed));
            }
        };

        let envelope = to_envelope(lat, lon, self.config.half_width_m);
        let _permit = limiter
            .acquire()
            .await
            .map_err(|e| SchedulerError::Internal(format!("concurrency limiter: {}", e)))?;

        self.metrics.attempt_issued();
        let outcome = match self.source.fetch_depth(&envelope, task.layer_attempt).await {
            Ok(response) => AttemptOutcome::Features(response.features),
            Err(e) => {
                debug!(
                    coord = %task.coord,
                    layer = task.layer_attempt,
                    status = e.status(),
                    error = %e,
                    "Depth query failed"
                );
                self.metrics.attempt_failed(&e);
                AttemptOutcome::Failed(e)
            }
        };

        Ok((task, outcome))
    }

    /// Puts retried tasks back on the queue, keeping their relative order.
    fn requeue(&self, queue: &mut VecDeque<CoordinateTask>, retries: Vec<CoordinateTask>) {
        match self.config.requeue {
            RequeuePolicy::Front => {
                for task in retries.into_iter().rev() {
                    queue.push_front(task);
                }
            }
            RequeuePolicy::Back => queue.extend(retries),
        }
    }

    fn complete(&self, result: &ResolutionResult) {
        if result.attempts == 0 {
            self.metrics.malformed();
        } else if result.has_data() {
            self.metrics.resolved();
        } else {
            self.metrics.exhausted();
        }

        if let Some(progress) = &self.progress {
            progress(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Envelope;
    use crate::provider::{FetchError, Feature, QueryResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Source that finds data from a fixed layer onwards, for every point.
    struct LayerSource {
        data_from_layer: Option<u32>,
        layers_seen: Mutex<Vec<u32>>,
    }

    impl LayerSource {
        fn new(data_from_layer: Option<u32>) -> Self {
            Self {
                data_from_layer,
                layers_seen: Mutex::new(Vec::new()),
            }
        }

        fn layers_seen(&self) -> Vec<u32> {
            self.layers_seen.lock().unwrap().clone()
        }
    }

    impl DepthSource for LayerSource {
        async fn fetch_depth(
            &self,
            _envelope: &Envelope,
            layer: u32,
        ) -> Result<QueryResponse, FetchError> {
            self.layers_seen.lock().unwrap().push(layer);
            match self.data_from_layer {
                Some(from) if layer >= from => Ok(QueryResponse::from_features(vec![
                    Feature::with_value("depth", layer as f64),
                ])),
                _ => Err(FetchError::Api { status: 500 }),
            }
        }

        fn name(&self) -> &str {
            "layers"
        }
    }

    fn small_config() -> SchedulerConfig {
        SchedulerConfig::default()
            .with_batch_size(2)
            .with_concurrency(2)
            .with_rate_limit(6000)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = BatchScheduler::new(
            LayerSource::new(None),
            SchedulerConfig::default().with_batch_size(0),
        );
        assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_rejects_configs_that_cannot_run() {
        let huge_concurrency = BatchScheduler::new(
            LayerSource::new(None),
            SchedulerConfig::default().with_concurrency(usize::MAX),
        );
        assert!(matches!(
            huge_concurrency,
            Err(SchedulerError::InvalidConfig(_))
        ));

        let endless_delay = BatchScheduler::new(
            LayerSource::new(None),
            SchedulerConfig::default()
                .with_batch_size(usize::MAX)
                .with_rate_limit(1),
        );
        assert!(matches!(endless_delay, Err(SchedulerError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_empty_input_resolves_to_nothing() {
        let scheduler = BatchScheduler::new(LayerSource::new(Some(0)), small_config()).unwrap();
        let results = scheduler.resolve(Vec::new()).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(scheduler.metrics().snapshot().batches, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_to_data_layer() {
        let scheduler = BatchScheduler::new(LayerSource::new(Some(2)), small_config()).unwrap();

        let results = scheduler
            .resolve(vec![Coordinate::new("-2.21", "-47.43")])
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].layer, Some(2));
        assert_eq!(results[0].attempts, 3);
        assert_eq!(results[0].depth("depth"), Some(2.0));
        assert_eq!(scheduler.source().layers_seen(), vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_coordinate_skips_fetch() {
        let scheduler = BatchScheduler::new(LayerSource::new(Some(0)), small_config()).unwrap();

        let results = scheduler
            .resolve(vec![Coordinate::new("abc", "-47.43")])
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].features.is_empty());
        assert!(scheduler.source().layers_seen().is_empty());
        assert_eq!(scheduler.metrics().snapshot().malformed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_front_requeue_finishes_retries_first() {
        let config = small_config().with_batch_size(1).with_concurrency(1);
        let scheduler = BatchScheduler::new(LayerSource::new(Some(1)), config).unwrap();

        let results = scheduler
            .resolve(vec![
                Coordinate::new("1.0", "1.0"),
                Coordinate::new("2.0", "2.0"),
            ])
            .await
            .unwrap();

        let order: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 1]);
        assert_eq!(scheduler.source().layers_seen(), vec![0, 1, 0, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_requeue_interleaves() {
        let config = small_config()
            .with_batch_size(1)
            .with_concurrency(1)
            .with_requeue(RequeuePolicy::Back);
        let scheduler = BatchScheduler::new(LayerSource::new(Some(1)), config).unwrap();

        scheduler
            .resolve(vec![
                Coordinate::new("1.0", "1.0"),
                Coordinate::new("2.0", "2.0"),
            ])
            .await
            .unwrap();

        assert_eq!(scheduler.source().layers_seen(), vec![0, 0, 1, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_called_per_result() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let scheduler = BatchScheduler::new(LayerSource::new(None), small_config())
            .unwrap()
            .with_progress(Arc::new(move |_: &ResolutionResult| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        scheduler
            .resolve(vec![
                Coordinate::new("1.0", "1.0"),
                Coordinate::new("x", "2.0"),
                Coordinate::new("3.0", "3.0"),
            ])
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let scheduler = BatchScheduler::new(LayerSource::new(Some(0)), small_config()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = scheduler
            .resolve_with_cancellation(vec![Coordinate::new("1", "1")], cancel)
            .await;

        assert_eq!(result, Err(SchedulerError::Cancelled));
        assert!(scheduler.source().layers_seen().is_empty());
    }
}
