//! Retry strategies and backoff implementations.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - how long to wait and how often to retry
//! - [`ExponentialBackoff`] - exponential backoff with jitter
//! - [`RetryPolicy`] - backoff plus the set of transient HTTP statuses
//! - [`retry`] - drives an async operation under a strategy
//!
//! # Examples
//!
//! ```rust
//! use resourcely_core::retry::{RetryDecision, RetryPolicy, retry};
//!
//! # async fn example() {
//! let policy = RetryPolicy::never();
//! let outcome = retry(&policy, || async { 503u16 }, |status| {
//!     if policy.is_retryable_status(*status) {
//!         RetryDecision::Retry
//!     } else {
//!         RetryDecision::Stop
//!     }
//! })
//! .await;
//! assert_eq!(outcome.value, 503);
//! # }
//! ```

mod exponential;
mod policy;
mod strategy;

pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use policy::RetryPolicy;
pub use strategy::{BackoffStrategy, RetryDecision, Retried, retry};
