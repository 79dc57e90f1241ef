//! Which HTTP outcomes count as transient.

use super::{BackoffStrategy, ExponentialBackoff};
use std::time::Duration;

/// Retry policy for HTTP exchanges: a backoff schedule plus the set of
/// status codes that are retried.
///
/// Connection-level failures (refused, reset, timed out) are always
/// retryable. By default the retryable statuses are 429 and every 5xx except
/// 501, matching the usual behaviour of retrying HTTP clients; an explicit
/// list replaces that rule.
///
/// # Examples
///
/// ```rust
/// use resourcely_core::retry::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert!(policy.is_retryable_status(503));
/// assert!(!policy.is_retryable_status(501));
/// assert!(!policy.is_retryable_status(404));
///
/// let strict = RetryPolicy::default().with_retryable_statuses([503]);
/// assert!(!strict.is_retryable_status(500));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryPolicy {
    backoff: ExponentialBackoff,
    statuses: Option<Vec<u16>>,
}

impl RetryPolicy {
    /// Create a policy with the given backoff and the default status rule.
    pub fn new(backoff: ExponentialBackoff) -> Self {
        Self {
            backoff,
            statuses: None,
        }
    }

    /// A policy that performs exactly one attempt.
    pub fn never() -> Self {
        Self::new(ExponentialBackoff::none())
    }

    /// Replace the default status rule with an explicit list.
    pub fn with_retryable_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }

    /// The backoff schedule.
    pub fn backoff(&self) -> &ExponentialBackoff {
        &self.backoff
    }

    /// Whether a response with this status should be retried.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        match &self.statuses {
            Some(statuses) => statuses.contains(&status),
            None => status == 429 || ((500..=599).contains(&status) && status != 501),
        }
    }
}

impl BackoffStrategy for RetryPolicy {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        self.backoff.next_delay(attempt)
    }

    fn max_retries(&self) -> u32 {
        self.backoff.max_retries()
    }
}
