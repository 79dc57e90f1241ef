//! Context questions

use super::null_as_default;
use serde::{Deserialize, Serialize};

/// One answer choice of a context question.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContextQuestionOption {
    /// Choice text
    pub label: String,
}

/// Fields shared by a context question record and its write payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextQuestionFields {
    /// Key used to reference the question; unique within a tenant
    pub label: String,
    /// Question shown to developers
    pub prompt: String,
    /// Question type
    pub qtype: String,
    /// Expected answer format
    pub answer_format: String,
    /// Ownership scope
    pub scope: String,
    /// Answer choices for select-type questions
    #[serde(deserialize_with = "null_as_default")]
    pub context_question_options: Vec<ContextQuestionOption>,
    /// Blueprint categories the question applies to
    #[serde(deserialize_with = "null_as_default")]
    pub blueprint_categories: Vec<String>,
    /// Validation pattern for free-text answers
    pub regex_pattern: String,
    /// Blueprint series the question never applies to
    #[serde(deserialize_with = "null_as_default")]
    pub excluded_blueprint_series: Vec<String>,
}

/// A context question as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextQuestion {
    /// Version-specific id
    pub id: String,
    /// Series id, stable across versions
    pub series_id: String,
    /// Version number
    pub version: i64,
    /// Shared fields
    #[serde(flatten)]
    pub fields: ContextQuestionFields,
}

/// Payload for creating a context question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewContextQuestion {
    /// Shared fields
    #[serde(flatten)]
    pub fields: ContextQuestionFields,
}

/// Full-replace payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatedContextQuestion {
    /// Series to update
    #[serde(skip)]
    pub series_id: String,
    /// Shared fields
    #[serde(flatten)]
    pub fields: ContextQuestionFields,
}
