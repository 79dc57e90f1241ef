//! Global values
//!
//! The API calls these "presets"; the collection path is `presets`.

use super::null_as_default;
use resourcely_core::json::JsonString;
use serde::{Deserialize, Serialize};

/// One selectable option of a global value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalValueOption {
    /// Option key, unique within the global value
    pub key: String,
    /// Display label
    pub label: String,
    /// Optional description, omitted from payloads when empty
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Option value, any JSON
    pub value: JsonString,
}

/// Fields shared by a global value record and its write payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalValueFields {
    /// Display name
    pub name: String,
    /// Optional description, omitted from payloads when empty
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Selectable options
    #[serde(deserialize_with = "null_as_default")]
    pub options: Vec<GlobalValueOption>,
}

/// A global value as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalValue {
    /// Version-specific id
    pub id: String,
    /// Series id, stable across versions
    pub series_id: String,
    /// Version number
    pub version: i64,
    /// Shared fields
    #[serde(flatten)]
    pub fields: GlobalValueFields,
    /// Human-assigned key, unique within a tenant
    pub key: String,
    /// Value type
    #[serde(rename = "type")]
    pub value_type: String,
    /// Whether new uses are discouraged
    pub is_deprecated: bool,
}

/// Payload for creating a global value.
///
/// `key` and `type` are fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewGlobalValue {
    /// Shared fields
    #[serde(flatten)]
    pub fields: GlobalValueFields,
    /// Human-assigned key
    pub key: String,
    /// Value type
    #[serde(rename = "type")]
    pub value_type: String,
}

/// Full-replace payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatedGlobalValue {
    /// Series to update
    #[serde(skip)]
    pub series_id: String,
    /// Shared fields
    #[serde(flatten)]
    pub fields: GlobalValueFields,
    /// Whether new uses are discouraged
    pub is_deprecated: bool,
}

/// One page of a global value query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GlobalValuesQueryResponse {
    /// Page number
    pub page: u32,
    /// Page size
    pub page_size: u32,
    /// Total number of pages
    pub total_pages: u32,
    /// Total number of matches across all pages
    pub total_items: usize,
    /// Records on this page
    #[serde(deserialize_with = "null_as_default")]
    pub page_items: Vec<GlobalValue>,
}
