//! Blueprint reconciliation
//!
//! Blueprints split their writes: `is_published` only changes through
//! `PATCH`, everything else through `PUT`.

use super::{Planned, SplitUpdate, UpdateActions, resolve_update_actions};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::resources::Blueprints;
use crate::types::{Blueprint, BlueprintFields, Label, PatchedBlueprint, UpdatedBlueprint};
use std::collections::BTreeSet;

/// Caller-controlled blueprint attributes, observed or desired.
///
/// Set-valued attributes compare without regard to order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintState {
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Template source
    pub content: String,
    /// Categories
    pub categories: BTreeSet<String>,
    /// Guidance shown to developers
    pub guidance: String,
    /// Label texts
    pub labels: BTreeSet<String>,
    /// Excluded context question series
    pub excluded_context_question_series: BTreeSet<String>,
    /// Publication state, the one patch-only attribute
    pub is_published: Planned<bool>,
}

impl BlueprintState {
    /// The state a record represents.
    pub fn from_record(record: &Blueprint) -> Self {
        let fields = &record.fields;
        Self {
            name: fields.name.clone(),
            description: fields.description.clone(),
            content: fields.content.clone(),
            categories: fields.categories.iter().cloned().collect(),
            guidance: fields.guidance.clone(),
            labels: fields.labels.iter().map(|l| l.label.clone()).collect(),
            excluded_context_question_series: fields
                .excluded_context_question_series
                .iter()
                .cloned()
                .collect(),
            is_published: Planned::Known(record.is_published),
        }
    }

    /// Full-replace fields for a write payload.
    pub fn to_fields(&self) -> BlueprintFields {
        BlueprintFields {
            name: self.name.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            categories: self.categories.iter().cloned().collect(),
            guidance: self.guidance.clone(),
            labels: self.labels.iter().map(|l| Label::new(l.as_str())).collect(),
            excluded_context_question_series: self
                .excluded_context_question_series
                .iter()
                .cloned()
                .collect(),
        }
    }

    /// Plan the writes that turn this observed state into `desired`.
    ///
    /// Returns `None` when nothing differs.
    pub fn plan_update(
        &self,
        desired: &BlueprintState,
        series_id: &str,
    ) -> Option<BlueprintUpdatePlan> {
        if !self.patch_fields_changed(desired) && !self.update_fields_changed(desired) {
            return None;
        }

        let actions = resolve_update_actions(self, desired);
        let update = actions.needs_update.then(|| UpdatedBlueprint {
            series_id: series_id.to_string(),
            fields: desired.to_fields(),
        });
        let patch = desired
            .is_published
            .as_known()
            .filter(|_| actions.needs_patch)
            .map(|&is_published| PatchedBlueprint {
                series_id: series_id.to_string(),
                is_published,
            });

        Some(BlueprintUpdatePlan {
            actions,
            update,
            patch,
        })
    }
}

impl SplitUpdate for BlueprintState {
    fn patch_fields_changed(&self, desired: &Self) -> bool {
        desired.is_published.is_known() && desired.is_published != self.is_published
    }

    fn update_fields_changed(&self, desired: &Self) -> bool {
        self.categories != desired.categories
            || self.content != desired.content
            || self.description != desired.description
            || self.excluded_context_question_series != desired.excluded_context_question_series
            || self.guidance != desired.guidance
            || self.labels != desired.labels
            || self.name != desired.name
    }
}

/// The writes one reconciliation pass issues for a blueprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintUpdatePlan {
    actions: UpdateActions,
    update: Option<UpdatedBlueprint>,
    patch: Option<PatchedBlueprint>,
}

impl BlueprintUpdatePlan {
    /// Which verbs will be issued.
    pub fn actions(&self) -> UpdateActions {
        self.actions
    }

    /// The `PUT` payload, if a full update is needed.
    pub fn update(&self) -> Option<&UpdatedBlueprint> {
        self.update.as_ref()
    }

    /// The `PATCH` payload, if a patch is needed.
    pub fn patch(&self) -> Option<&PatchedBlueprint> {
        self.patch.as_ref()
    }

    /// Issue `PUT` then `PATCH`, as needed.
    ///
    /// When both run, the series passes through an intermediate version that
    /// concurrent readers can observe; it is returned alongside the final
    /// record. A failed `PUT` stops before the `PATCH`.
    pub async fn apply(
        &self,
        ctx: &Context,
        blueprints: &Blueprints,
    ) -> Result<AppliedUpdate<Blueprint>> {
        let updated = match &self.update {
            Some(update) => Some(blueprints.update(ctx, update).await?),
            None => None,
        };
        let patched = match &self.patch {
            Some(patch) => Some(blueprints.patch(ctx, patch).await?),
            None => None,
        };

        match (updated, patched) {
            (Some(intermediate), Some(record)) => Ok(AppliedUpdate {
                record,
                intermediate: Some(intermediate),
            }),
            (Some(record), None) | (None, Some(record)) => Ok(AppliedUpdate {
                record,
                intermediate: None,
            }),
            (None, None) => Err(Error::Other(anyhow::anyhow!(
                "blueprint update plan contains no writes"
            ))),
        }
    }
}

/// Result of applying an update plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedUpdate<T> {
    /// Record returned by the last write; the new observed state.
    pub record: T,
    /// Record returned by an earlier write in the same pass, if any.
    pub intermediate: Option<T>,
}
