//! Wire types for the Resourcely API
//!
//! Each entity kind has a record type (what the server returns), a `New*`
//! payload for creation and an `Updated*` payload for full replacement.
//! Update payloads carry the series id they address, but never serialise it:
//! it travels in the request path.

use serde::{Deserialize, Deserializer};

pub use blueprint::{Blueprint, BlueprintFields, NewBlueprint, PatchedBlueprint, UpdatedBlueprint};
pub use blueprint_template::{
    BlueprintTemplate, BlueprintTemplateFields, NewBlueprintTemplate, UpdatedBlueprintTemplate,
};
pub use context_question::{
    ContextQuestion, ContextQuestionFields, ContextQuestionOption, NewContextQuestion,
    UpdatedContextQuestion,
};
pub use global_value::{
    GlobalValue, GlobalValueFields, GlobalValueOption, GlobalValuesQueryResponse, NewGlobalValue,
    UpdatedGlobalValue,
};
pub use guardrail::{
    Guardrail, GuardrailFields, GuardrailTemplateRef, NewGuardrail, UpdatedGuardrail,
};
pub use system::SystemHealth;

pub mod blueprint;
pub mod blueprint_template;
pub mod context_question;
pub mod global_value;
pub mod guardrail;
pub mod system;

/// A record that exists in several versions under one series.
pub trait Versioned {
    /// Identity of this specific version.
    fn id(&self) -> &str;
    /// Identity shared by every version of the resource.
    fn series_id(&self) -> &str;
    /// Version number, starting at 1.
    fn version(&self) -> i64;
}

/// A write payload addressed to an existing series.
pub trait SeriesAddressed {
    /// Series the payload is applied to.
    fn series_id(&self) -> &str;
}

/// Free-form label attached to blueprints and templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, Deserialize)]
pub struct Label {
    /// Label text
    pub label: String,
}

impl Label {
    /// Create a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl From<&str> for Label {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Decode `null` as the type's default, the way missing fields are.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

macro_rules! versioned {
    ($($record:ty),+ $(,)?) => {
        $(
            impl Versioned for $record {
                fn id(&self) -> &str {
                    &self.id
                }

                fn series_id(&self) -> &str {
                    &self.series_id
                }

                fn version(&self) -> i64 {
                    self.version
                }
            }
        )+
    };
}

macro_rules! series_addressed {
    ($($payload:ty),+ $(,)?) => {
        $(
            impl SeriesAddressed for $payload {
                fn series_id(&self) -> &str {
                    &self.series_id
                }
            }
        )+
    };
}

versioned!(Blueprint, BlueprintTemplate, ContextQuestion, Guardrail, GlobalValue);
series_addressed!(
    UpdatedBlueprint,
    PatchedBlueprint,
    UpdatedBlueprintTemplate,
    UpdatedContextQuestion,
    UpdatedGuardrail,
    UpdatedGlobalValue,
);
