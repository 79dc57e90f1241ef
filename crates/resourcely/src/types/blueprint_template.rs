//! Blueprint templates

use super::{Label, null_as_default};
use serde::{Deserialize, Serialize};

/// Fields shared by a blueprint template record and its write payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintTemplateFields {
    /// Display name
    pub name: String,
    /// Optional description, omitted from payloads when empty
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Template source
    pub content: String,
    /// Categories
    #[serde(deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    /// Guidance shown to developers
    pub guidance: String,
    /// Attached labels
    #[serde(deserialize_with = "null_as_default")]
    pub labels: Vec<Label>,
}

/// A blueprint template as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintTemplate {
    /// Version-specific id
    pub id: String,
    /// Series id, stable across versions
    pub series_id: String,
    /// Version number
    pub version: i64,
    /// Ownership scope
    pub scope: String,
    /// Shared fields
    #[serde(flatten)]
    pub fields: BlueprintTemplateFields,
    /// Cloud provider
    pub provider: String,
}

/// Payload for creating a blueprint template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewBlueprintTemplate {
    /// Shared fields
    #[serde(flatten)]
    pub fields: BlueprintTemplateFields,
    /// Cloud provider
    pub provider: String,
}

/// Full-replace payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatedBlueprintTemplate {
    /// Series to update
    #[serde(skip)]
    pub series_id: String,
    /// Shared fields
    #[serde(flatten)]
    pub fields: BlueprintTemplateFields,
}
