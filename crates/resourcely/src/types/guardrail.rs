//! Guardrails

use resourcely_core::json::JsonString;
use serde::{Deserialize, Serialize};

/// Fields shared by a guardrail record and its write payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailFields {
    /// Display name
    pub name: String,
    /// Optional description, omitted from payloads when empty
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Cloud provider
    pub provider: String,
    /// Guardrail category
    pub category: String,
    /// Enforcement state
    pub state: String,
    /// Policy source
    pub content: String,
}

/// Reference to the template a guardrail was rendered from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailTemplateRef {
    /// Template series id
    pub series_id: String,
}

/// A guardrail as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guardrail {
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
    pub fields: GuardrailFields,
    /// Template this guardrail was rendered from, if any
    pub guardrail_template: Option<GuardrailTemplateRef>,
    /// Inputs the template was rendered with
    pub guardrail_template_inputs: Option<JsonString>,
}

impl Guardrail {
    /// Series id of the source template, or `""` when there is none.
    pub fn guardrail_template_series_id(&self) -> &str {
        self.guardrail_template
            .as_ref()
            .map_or("", |t| t.series_id.as_str())
    }
}

/// Payload for creating a guardrail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewGuardrail {
    /// Shared fields
    #[serde(flatten)]
    pub fields: GuardrailFields,
    /// Template to render from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrail_template_series_id: Option<String>,
    /// Template inputs, sent as embedded JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrail_template_inputs: Option<JsonString>,
}

/// Full-replace payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatedGuardrail {
    /// Series to update
    #[serde(skip)]
    pub series_id: String,
    /// Shared fields
    #[serde(flatten)]
    pub fields: GuardrailFields,
    /// Template to render from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrail_template_series_id: Option<String>,
    /// Template inputs, sent as embedded JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrail_template_inputs: Option<JsonString>,
}
