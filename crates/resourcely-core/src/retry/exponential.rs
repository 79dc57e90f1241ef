//! Capped exponential backoff.

use super::strategy::BackoffStrategy;
use std::time::Duration;

const DEFAULT_MAX_RETRIES: u32 = 4;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);
const DEFAULT_MULTIPLIER: f64 = 2.0;
const DEFAULT_JITTER: f64 = 0.1;

/// Delays that double (by default) after every failed attempt, up to a cap.
///
/// The n-th retry waits `initial_delay * multiplier^n`, spread by up to
/// `jitter` of itself in either direction, and never longer than
/// `max_delay`. Defaults: four retries, 1s doubling to at most 30s.
///
/// # Examples
///
/// ```rust
/// use resourcely_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(250))
///     .max_delay(Duration::from_secs(10))
///     .jitter(0.0)
///     .build();
///
/// assert_eq!(backoff.max_retries(), 5);
/// assert_eq!(backoff.next_delay(2), Some(Duration::from_secs(1)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: f64,
}

impl ExponentialBackoff {
    /// Start from the defaults.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// A schedule with no retries at all.
    pub fn none() -> Self {
        Self::builder().max_retries(0).build()
    }

    /// Delay before the first retry, before jitter.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Cap on any single delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    fn spread(&self, delay: f64) -> f64 {
        if self.jitter == 0.0 {
            return delay;
        }
        let offset = rand::random::<f64>().mul_add(2.0, -1.0);
        delay + delay * self.jitter * offset
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let max = self.max_delay.as_secs_f64();
        let delay = (self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent)).min(max);
        let capped = self.spread(delay).clamp(0.0, max);
        Some(Duration::from_secs_f64(capped))
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Builder for [`ExponentialBackoff`].
#[derive(Debug, Clone)]
pub struct ExponentialBackoffBuilder {
    inner: ExponentialBackoff,
}

impl Default for ExponentialBackoffBuilder {
    fn default() -> Self {
        Self {
            inner: ExponentialBackoff {
                max_retries: DEFAULT_MAX_RETRIES,
                initial_delay: DEFAULT_INITIAL_DELAY,
                max_delay: DEFAULT_MAX_DELAY,
                multiplier: DEFAULT_MULTIPLIER,
                jitter: DEFAULT_JITTER,
            },
        }
    }
}

impl ExponentialBackoffBuilder {
    /// Retries after the first attempt. Default: 4.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.inner.max_retries = max_retries;
        self
    }

    /// Delay before the first retry. Default: 1s.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.inner.initial_delay = delay;
        self
    }

    /// Cap on any single delay. Default: 30s.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.inner.max_delay = delay;
        self
    }

    /// Growth factor between consecutive delays. Default: 2.0.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.inner.multiplier = multiplier;
        self
    }

    /// Relative spread of each delay, clamped to `0.0..=1.0`. Default: 0.1.
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.inner.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Finish building.
    pub fn build(self) -> ExponentialBackoff {
        self.inner
    }
}
