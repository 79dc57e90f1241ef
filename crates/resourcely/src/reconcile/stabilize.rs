//! Plan stabilisation for opaque JSON attributes

use super::Planned;
use crate::error::Result;
use crate::types::{GlobalValueOption, Guardrail, GuardrailFields, NewGuardrail, UpdatedGuardrail};
use resourcely_core::json::JsonString;

/// Keep the stored byte form when the proposed JSON is equivalent to it.
///
/// Only applies when both sides are known; otherwise the proposed value
/// stands. Malformed JSON on either side is an error.
pub fn stabilize_json(
    proposed: &Planned<JsonString>,
    stored: &Planned<JsonString>,
) -> Result<Planned<JsonString>> {
    if let (Planned::Known(p), Planned::Known(s)) = (proposed, stored)
        && p.is_equivalent(s)?
    {
        return Ok(stored.clone());
    }
    Ok(proposed.clone())
}

/// Caller-controlled guardrail attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardrailState {
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Cloud provider
    pub provider: String,
    /// Category
    pub category: String,
    /// Enforcement state
    pub state: String,
    /// Policy source
    pub content: String,
    /// Template series id, empty when not rendered from a template
    pub guardrail_template_series_id: String,
    /// Template inputs
    pub guardrail_template_inputs: Planned<JsonString>,
}

impl GuardrailState {
    /// The state a record represents.
    pub fn from_record(record: &Guardrail) -> Self {
        let fields = &record.fields;
        Self {
            name: fields.name.clone(),
            description: fields.description.clone(),
            provider: fields.provider.clone(),
            category: fields.category.clone(),
            state: fields.state.clone(),
            content: fields.content.clone(),
            guardrail_template_series_id: record.guardrail_template_series_id().to_string(),
            guardrail_template_inputs: record.guardrail_template_inputs.clone().into(),
        }
    }

    /// Replace template inputs equivalent to the stored ones by the stored text.
    pub fn stabilize(mut self, stored: &GuardrailState) -> Result<Self> {
        self.guardrail_template_inputs =
            stabilize_json(&self.guardrail_template_inputs, &stored.guardrail_template_inputs)?;
        Ok(self)
    }

    /// Create payload.
    pub fn to_new(&self) -> NewGuardrail {
        NewGuardrail {
            fields: self.fields(),
            guardrail_template_series_id: self.template_series_id(),
            guardrail_template_inputs: self.guardrail_template_inputs.as_known().cloned(),
        }
    }

    /// Full-replace payload for `series_id`.
    pub fn to_update(&self, series_id: &str) -> UpdatedGuardrail {
        UpdatedGuardrail {
            series_id: series_id.to_string(),
            fields: self.fields(),
            guardrail_template_series_id: self.template_series_id(),
            guardrail_template_inputs: self.guardrail_template_inputs.as_known().cloned(),
        }
    }

    fn fields(&self) -> GuardrailFields {
        GuardrailFields {
            name: self.name.clone(),
            description: self.description.clone(),
            provider: self.provider.clone(),
            category: self.category.clone(),
            state: self.state.clone(),
            content: self.content.clone(),
        }
    }

    fn template_series_id(&self) -> Option<String> {
        Some(self.guardrail_template_series_id.clone()).filter(|id| !id.is_empty())
    }
}

/// Caller-controlled attributes of one global value option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalValueOptionState {
    /// Option key
    pub key: String,
    /// Display label
    pub label: String,
    /// Description
    pub description: String,
    /// Option value
    pub value: Planned<JsonString>,
}

impl GlobalValueOptionState {
    /// The state an option of a record represents.
    pub fn from_option(option: &GlobalValueOption) -> Self {
        Self {
            key: option.key.clone(),
            label: option.label.clone(),
            description: option.description.clone(),
            value: Planned::Known(option.value.clone()),
        }
    }

    /// Replace a value equivalent to the stored one by the stored text.
    pub fn stabilize(mut self, stored: &GlobalValueOptionState) -> Result<Self> {
        self.value = stabilize_json(&self.value, &stored.value)?;
        Ok(self)
    }

    /// Wire form; an unset value is sent as JSON `null`.
    pub fn to_option(&self) -> GlobalValueOption {
        GlobalValueOption {
            key: self.key.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            value: self.value.as_known().cloned().unwrap_or_default(),
        }
    }
}

/// Stabilise each proposed option against the stored option at the same
/// position. Options beyond the stored list are kept as proposed.
pub fn stabilize_options(
    proposed: Vec<GlobalValueOptionState>,
    stored: &[GlobalValueOptionState],
) -> Result<Vec<GlobalValueOptionState>> {
    proposed
        .into_iter()
        .enumerate()
        .map(|(i, option)| match stored.get(i) {
            Some(previous) => option.stabilize(previous),
            None => Ok(option),
        })
        .collect()
}
