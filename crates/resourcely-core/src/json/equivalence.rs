//! Structural comparison of JSON documents.

use serde_json::Value;
use thiserror::Error;

/// Error raised when a string handed to the comparison is not valid JSON.
///
/// Malformed input is a bug in whoever produced the string, so it is
/// reported instead of being treated as "not equal".
#[derive(Debug, Error)]
#[error("error unmarshalling string: {input} => {source}")]
pub struct JsonError {
    input: String,
    #[source]
    source: serde_json::Error,
}

impl JsonError {
    pub(crate) fn new(input: &str, source: serde_json::Error) -> Self {
        Self {
            input: input.to_string(),
            source,
        }
    }

    /// The text that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Parse `input` as a generic JSON value.
pub fn parse(input: &str) -> Result<Value, JsonError> {
    serde_json::from_str(input).map_err(|e| JsonError::new(input, e))
}

/// Check that `input` is a valid JSON document.
///
/// ```rust
/// use resourcely_core::json::validate;
///
/// assert!(validate(r#"{"a": [1, 2]}"#).is_ok());
/// assert!(validate("{a: 1}").is_err());
/// ```
pub fn validate(input: &str) -> Result<(), JsonError> {
    serde_json::from_str::<serde::de::IgnoredAny>(input)
        .map(|_| ())
        .map_err(|e| JsonError::new(input, e))
}

/// Decide whether two JSON strings describe the same value.
///
/// Object keys are compared regardless of order, arrays element by element
/// in order, and insignificant whitespace is ignored. Numbers compare by
/// numeric value, so `1` and `1.0` are equal.
///
/// # Errors
///
/// Returns [`JsonError`] if either side is not valid JSON.
///
/// # Examples
///
/// ```rust
/// use resourcely_core::json::is_equivalent;
///
/// assert!(is_equivalent(r#" {"x":1,"y":2} "#, r#"{"y":2,"x":1}"#).unwrap());
/// assert!(!is_equivalent("[1,2]", "[2,1]").unwrap());
/// assert!(is_equivalent("not json", "{}").is_err());
/// ```
pub fn is_equivalent(a: &str, b: &str) -> Result<bool, JsonError> {
    let a = parse(a)?;
    let b = parse(b)?;
    Ok(values_equal(&a, &b))
}

/// Deep structural equality over parsed values.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => false,
    }
}
