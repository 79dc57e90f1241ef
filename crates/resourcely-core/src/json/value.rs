//! Opaque JSON kept in its textual form.

use super::equivalence::{self, JsonError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// A JSON document held as text.
///
/// The exact bytes the caller supplied are preserved, so a value read back
/// from state compares byte-for-byte with what was written. The document is
/// only parsed when it is compared ([`JsonString::is_equivalent`]) or sent
/// over the wire, where it is embedded as a JSON value rather than a string.
///
/// ```rust
/// use resourcely_core::json::JsonString;
///
/// let stored = JsonString::new(r#"{"a": 1, "b": [true]}"#).unwrap();
/// let proposed = JsonString::new(r#"{"b":[true],"a":1}"#).unwrap();
///
/// assert_ne!(stored, proposed);
/// assert!(stored.is_equivalent(&proposed).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonString(String);

impl JsonString {
    /// Wrap `text`, rejecting anything that is not valid JSON.
    pub fn new(text: impl Into<String>) -> Result<Self, JsonError> {
        let text = text.into();
        equivalence::validate(&text)?;
        Ok(Self(text))
    }

    /// Render a parsed value in compact form.
    pub fn from_value(value: &Value) -> Self {
        Self(value.to_string())
    }

    /// The stored text, unchanged.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the stored text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Parse the stored text.
    pub fn to_value(&self) -> Result<Value, JsonError> {
        equivalence::parse(&self.0)
    }

    /// Structural comparison, see [`equivalence::is_equivalent`].
    pub fn is_equivalent(&self, other: &JsonString) -> Result<bool, JsonError> {
        equivalence::is_equivalent(&self.0, &other.0)
    }
}

/// The JSON `null` document.
impl Default for JsonString {
    fn default() -> Self {
        Self("null".to_string())
    }
}

impl fmt::Display for JsonString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JsonString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for JsonString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.to_value().map_err(serde::ser::Error::custom)?;
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}
