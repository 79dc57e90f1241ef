#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core building blocks for the Resourcely crates.
//!
//! This crate holds the pieces that do not depend on any HTTP client:
//!
//! - **Retry policy** via the `BackoffStrategy` trait and `RetryPolicy`
//!   - Exponential backoff with jitter
//!   - Classification of transient HTTP status codes
//! - **JSON equivalence** via [`json::is_equivalent`] and [`json::JsonString`]
//!
//! # Examples
//!
//! ```rust
//! use resourcely_core::prelude::*;
//! use std::time::Duration;
//!
//! let backoff = ExponentialBackoff::builder()
//!     .max_retries(3)
//!     .initial_delay(Duration::from_millis(100))
//!     .build();
//! assert_eq!(backoff.max_retries(), 3);
//!
//! assert!(is_equivalent(r#"{"a":1,"b":2}"#, r#"{ "b": 2, "a": 1 }"#).unwrap());
//! ```

pub mod json;
pub mod retry;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use resourcely_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::json::{JsonError, JsonString, is_equivalent};
    pub use crate::retry::{
        BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder, RetryPolicy, Retried,
    };
}
