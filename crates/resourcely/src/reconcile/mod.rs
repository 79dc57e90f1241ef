//! Reconciling desired state against observed records
//!
//! A caller holds the record it last observed and a desired state. The
//! resolver decides which writes bring the remote side in line, and the
//! JSON stabiliser keeps cosmetically different JSON from showing up as a
//! change at all.

mod blueprint;
mod stabilize;

pub use blueprint::{AppliedUpdate, BlueprintState, BlueprintUpdatePlan};
pub use stabilize::{GlobalValueOptionState, GuardrailState, stabilize_json, stabilize_options};

/// A desired attribute value.
///
/// `Unknown` is a value that will only be known after apply; `Null` means
/// the caller explicitly left the attribute unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Planned<T> {
    /// Not known until apply.
    #[default]
    Unknown,
    /// Explicitly unset.
    Null,
    /// A concrete value.
    Known(T),
}

impl<T> Planned<T> {
    /// `true` for [`Planned::Known`].
    pub fn is_known(&self) -> bool {
        matches!(self, Planned::Known(_))
    }

    /// The value, if known.
    pub fn as_known(&self) -> Option<&T> {
        match self {
            Planned::Known(value) => Some(value),
            _ => None,
        }
    }

    /// Consume and return the value, if known.
    pub fn into_known(self) -> Option<T> {
        match self {
            Planned::Known(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Planned<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Planned::Null, Planned::Known)
    }
}

/// Which write verbs a reconciliation pass needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateActions {
    /// A full replace (`PUT`) is required.
    pub needs_update: bool,
    /// A partial patch (`PATCH`) is required.
    pub needs_patch: bool,
}

/// An entity kind whose mutable fields are split across a full-replace and
/// a partial-patch verb.
pub trait SplitUpdate {
    /// Whether the patch-only fields are known in `desired` and differ from
    /// this observed state.
    fn patch_fields_changed(&self, desired: &Self) -> bool;

    /// Whether any full-replace field differs from this observed state.
    fn update_fields_changed(&self, desired: &Self) -> bool;
}

/// Decide which writes bring `observed` to `desired`.
///
/// Only call this once some change is known to exist: when the patch is not
/// needed, the change must be in a full-replace field, so a full update is
/// reported without comparing them.
pub fn resolve_update_actions<S>(observed: &S, desired: &S) -> UpdateActions
where
    S: SplitUpdate + ?Sized,
{
    let needs_patch = observed.patch_fields_changed(desired);
    let needs_update = !needs_patch || observed.update_fields_changed(desired);
    UpdateActions {
        needs_update,
        needs_patch,
    }
}
