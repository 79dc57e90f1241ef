//! Blueprints

use super::{Label, null_as_default};
use serde::{Deserialize, Serialize};

/// Fields shared by a blueprint record and its write payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintFields {
    /// Display name
    pub name: String,

    /// Optional description, omitted from payloads when empty
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Template source
    pub content: String,

    /// Blueprint categories
    #[serde(deserialize_with = "null_as_default")]
    pub categories: Vec<String>,

    /// Guidance shown to developers
    pub guidance: String,

    /// Attached labels
    #[serde(deserialize_with = "null_as_default")]
    pub labels: Vec<Label>,

    /// Context question series that never apply to this blueprint
    #[serde(deserialize_with = "null_as_default")]
    pub excluded_context_question_series: Vec<String>,
}

/// A blueprint as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blueprint {
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
    pub fields: BlueprintFields,
    /// Cloud provider
    pub provider: String,
    /// Whether developers can see the blueprint
    pub is_published: bool,
}

/// Payload for creating a blueprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewBlueprint {
    /// Shared fields
    #[serde(flatten)]
    pub fields: BlueprintFields,
    /// Cloud provider
    pub provider: String,
    /// Marks the blueprint as managed from infrastructure code
    pub is_terraform_managed: bool,
    /// Initial publication state
    pub is_published: bool,
}

/// Full-replace payload. `is_published` is not part of it; use
/// [`PatchedBlueprint`] for that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatedBlueprint {
    /// Series to update
    #[serde(skip)]
    pub series_id: String,
    /// Shared fields
    #[serde(flatten)]
    pub fields: BlueprintFields,
}

/// Partial-patch payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchedBlueprint {
    /// Series to patch
    #[serde(skip)]
    pub series_id: String,
    /// New publication state
    pub is_published: bool,
}
