//! Backoff strategy trait and the generic retry driver.

use std::future::Future;
use std::time::Duration;

/// A strategy for spacing out retries of a failed operation.
///
/// Implementations only answer two questions: how long to wait before the
/// next attempt, and how many retries are allowed at most. Whether a given
/// outcome is worth retrying is decided by the caller of [`retry`].
///
/// # Examples
///
/// ```rust
/// use resourcely_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .max_retries(3)
///     .initial_delay(Duration::from_millis(100))
///     .jitter(0.0)
///     .build();
///
/// assert_eq!(backoff.next_delay(1), Some(Duration::from_millis(200)));
/// ```
pub trait BackoffStrategy: Send + Sync {
    /// Calculate the delay before the next retry attempt.
    ///
    /// `attempt` is 0-indexed: `next_delay(0)` is the wait between the
    /// initial attempt and the first retry. `None` means stop retrying.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;

    /// Maximum number of retries after the initial attempt.
    ///
    /// With `max_retries() == 3` an operation runs at most 4 times.
    fn max_retries(&self) -> u32;
}

/// What to do with the outcome of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Hand the outcome back to the caller.
    Stop,
    /// Retry after the strategy's own delay.
    Retry,
    /// Retry after the given delay, typically taken from a `Retry-After` header.
    RetryAfter(Duration),
}

/// The final outcome of [`retry`] together with the number of retries it took.
#[derive(Debug)]
pub struct Retried<T> {
    /// Outcome of the last attempt.
    pub value: T,
    /// Number of retries performed (0 when the first attempt was final).
    pub retries: u32,
}

/// Run `operation` until `classify` says stop or the strategy is exhausted.
///
/// The outcome type is opaque to the driver, so callers can retry on an
/// `Ok` value (for instance an HTTP 503 response) as well as on errors.
/// Once retries are exhausted the last outcome is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use resourcely_core::retry::{ExponentialBackoff, RetryDecision, retry};
/// use std::time::Duration;
///
/// # async fn example() {
/// let backoff = ExponentialBackoff::builder()
///     .max_retries(2)
///     .initial_delay(Duration::from_millis(1))
///     .build();
///
/// let mut calls = 0;
/// let outcome = retry(
///     &backoff,
///     || {
///         calls += 1;
///         let n = calls;
///         async move { n }
///     },
///     |n| if *n < 3 { RetryDecision::Retry } else { RetryDecision::Stop },
/// )
/// .await;
///
/// assert_eq!(outcome.value, 3);
/// assert_eq!(outcome.retries, 2);
/// # }
/// ```
pub async fn retry<S, F, Fut, T, C>(strategy: &S, mut operation: F, classify: C) -> Retried<T>
where
    S: BackoffStrategy + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = T>,
    C: Fn(&T) -> RetryDecision,
{
    let mut attempt = 0;
    loop {
        let value = operation().await;

        let delay = match classify(&value) {
            RetryDecision::Stop => None,
            _ if attempt >= strategy.max_retries() => None,
            RetryDecision::Retry => strategy.next_delay(attempt),
            RetryDecision::RetryAfter(delay) => Some(delay),
        };

        let Some(delay) = delay else {
            return Retried {
                value,
                retries: attempt,
            };
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(attempt, ?delay, "retrying after transient failure");

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
