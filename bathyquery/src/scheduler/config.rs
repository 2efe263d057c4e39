//! Scheduler configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tokio::sync::Semaphore;

use super::error::SchedulerError;
use crate::projection::DEFAULT_HALF_WIDTH_M;

/// Default number of tasks dequeued per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default maximum number of fetches in flight.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default external rate ceiling, in requests per minute.
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;

/// Default number of attempts per coordinate (layers 0 through 4).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Where a task goes when it is retried against the next layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequeuePolicy {
    /// Ahead of every coordinate not yet attempted.
    ///
    /// Exhausts a coordinate's layers before new coordinates start.
    #[default]
    Front,

    /// Behind every queued coordinate (plain FIFO).
    Back,
}

impl RequeuePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequeuePolicy::Front => "front",
            RequeuePolicy::Back => "back",
        }
    }
}

impl fmt::Display for RequeuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequeuePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "front" => Ok(RequeuePolicy::Front),
            "back" => Ok(RequeuePolicy::Back),
            other => Err(format!("unknown requeue policy '{}'", other)),
        }
    }
}

/// Configuration for a [`BatchScheduler`](super::BatchScheduler).
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Tasks taken from the front of the queue per batch.
    pub batch_size: usize,

    /// Maximum fetches in flight at once.
    ///
    /// May be smaller than `batch_size`; the batch then runs in waves but
    /// is still joined as a whole before the retry decision.
    pub concurrency: usize,

    /// External rate ceiling in requests per minute.
    pub rate_limit_per_minute: u32,

    /// Attempts per coordinate, one layer each, starting at layer 0.
    pub max_attempts: u32,

    /// Half-width of the query envelope in metres.
    pub half_width_m: f64,

    /// Placement of retried tasks.
    pub requeue: RequeuePolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            half_width_m: DEFAULT_HALF_WIDTH_M,
            requeue: RequeuePolicy::default(),
        }
    }
}

impl SchedulerConfig {
    /// Set the batch dequeue size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the concurrency bound.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the external rate ceiling.
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit_per_minute = per_minute;
        self
    }

    /// Set the attempt ceiling.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the envelope half-width.
    pub fn with_half_width(mut self, half_width_m: f64) -> Self {
        self.half_width_m = half_width_m;
        self
    }

    /// Set the requeue policy.
    pub fn with_requeue(mut self, requeue: RequeuePolicy) -> Self {
        self.requeue = requeue;
        self
    }

    /// Delay between batches so that `batch_size` requests per delay stay
    /// under the rate ceiling: `60 / (rate / batch_size)` seconds.
    ///
    /// Saturates at [`Duration::MAX`]; [`validate`](Self::validate) rejects
    /// configurations whose delay does not fit.
    pub fn inter_batch_delay(&self) -> Duration {
        self.checked_delay().unwrap_or(Duration::MAX)
    }

    fn checked_delay(&self) -> Option<Duration> {
        if self.rate_limit_per_minute == 0 {
            return Some(Duration::ZERO);
        }
        let batches_per_minute = self.rate_limit_per_minute as f64 / self.batch_size as f64;
        Duration::try_from_secs_f64(60.0 / batches_per_minute).ok()
    }

    /// Checks that the configuration can drive a run.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.batch_size == 0 {
            return Err(SchedulerError::InvalidConfig(
                "batch_size must be > 0".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(SchedulerError::InvalidConfig(
                "concurrency must be > 0".to_string(),
            ));
        }
        if self.concurrency > Semaphore::MAX_PERMITS {
            return Err(SchedulerError::InvalidConfig(format!(
                "concurrency must be <= {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.rate_limit_per_minute == 0 {
            return Err(SchedulerError::InvalidConfig(
                "rate_limit_per_minute must be > 0".to_string(),
            ));
        }
        if self.checked_delay().is_none() {
            return Err(SchedulerError::InvalidConfig(format!(
                "inter-batch delay for batch_size {} at {}/min is too long",
                self.batch_size, self.rate_limit_per_minute
            )));
        }
        if self.max_attempts == 0 {
            return Err(SchedulerError::InvalidConfig(
                "max_attempts must be > 0".to_string(),
            ));
        }
        if !(self.half_width_m.is_finite() && self.half_width_m > 0.0) {
            return Err(SchedulerError::InvalidConfig(format!(
                "half_width_m must be a positive number, got {}",
                self.half_width_m
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.rate_limit_per_minute, 60);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.half_width_m, 1000.0);
        assert_eq!(config.requeue, RequeuePolicy::Front);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_delay_is_ten_seconds() {
        assert_eq!(
            SchedulerConfig::default().inter_batch_delay(),
            Duration::from_millis(10_000)
        );
    }

    #[test]
    fn test_delay_scales_with_batch_size() {
        let config = SchedulerConfig::default()
            .with_batch_size(5)
            .with_rate_limit(60);
        assert_eq!(config.inter_batch_delay(), Duration::from_secs(5));

        let config = SchedulerConfig::default()
            .with_batch_size(1)
            .with_rate_limit(600);
        assert_eq!(config.inter_batch_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_builder_pattern() {
        let config = SchedulerConfig::default()
            .with_batch_size(3)
            .with_concurrency(2)
            .with_rate_limit(120)
            .with_max_attempts(2)
            .with_half_width(250.0)
            .with_requeue(RequeuePolicy::Back);

        assert_eq!(config.batch_size, 3);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.rate_limit_per_minute, 120);
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.half_width_m, 250.0);
        assert_eq!(config.requeue, RequeuePolicy::Back);
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        let base = SchedulerConfig::default();
        assert!(base.clone().with_batch_size(0).validate().is_err());
        assert!(base.clone().with_concurrency(0).validate().is_err());
        assert!(base.clone().with_rate_limit(0).validate().is_err());
        assert!(base.clone().with_max_attempts(0).validate().is_err());
        assert!(base.clone().with_half_width(0.0).validate().is_err());
        assert!(base.with_half_width(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unrepresentable_delay() {
        let config = SchedulerConfig::default()
            .with_batch_size(usize::MAX)
            .with_rate_limit(1);
        assert!(matches!(
            config.validate(),
            Err(SchedulerError::InvalidConfig(_))
        ));
        assert_eq!(config.inter_batch_delay(), Duration::MAX);
    }

    #[test]
    fn test_validate_rejects_concurrency_above_semaphore_limit() {
        let config = SchedulerConfig::default().with_concurrency(usize::MAX);
        assert!(matches!(
            config.validate(),
            Err(SchedulerError::InvalidConfig(_))
        ));
        assert!(SchedulerConfig::default()
            .with_concurrency(Semaphore::MAX_PERMITS)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_requeue_policy_parse() {
        assert_eq!("front".parse::<RequeuePolicy>(), Ok(RequeuePolicy::Front));
        assert_eq!(" BACK ".parse::<RequeuePolicy>(), Ok(RequeuePolicy::Back));
        assert!("middle".parse::<RequeuePolicy>().is_err());
        assert_eq!(RequeuePolicy::Back.to_string(), "back");
    }
}
