//! HTTP layer
//!
//! [`Transport`] owns the connection pool, credentials and retry policy.
//! [`RequestBuilder`] sends one logical request, retrying transient
//! failures, and [`Response`] classifies and decodes what came back.

pub use request::RequestBuilder;
pub use response::{RawResponse, Response};
pub use transport::Transport;

mod request;
mod response;
mod transport;

// Re-export HTTP types from the http crate for convenience
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
