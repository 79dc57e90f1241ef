//! Global value lookup by key

use super::{Entity, GlobalValues};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::types::{GlobalValue, GlobalValuesQueryResponse};

/// Outcome of a lookup by a key that should be unique.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyLookup<T> {
    /// Nothing has the key.
    Missing,
    /// Exactly one record has the key.
    Unique(T),
    /// Several records have the key; the first by series id is kept.
    Ambiguous {
        /// Best-effort first match
        first: T,
        /// Number of matches the server reported
        matches: usize,
    },
}

impl<T> KeyLookup<T> {
    /// The matched record, if any, regardless of ambiguity.
    pub fn first(self) -> Option<T> {
        match self {
            KeyLookup::Missing => None,
            KeyLookup::Unique(record) | KeyLookup::Ambiguous { first: record, .. } => Some(record),
        }
    }
}

impl KeyLookup<GlobalValue> {
    /// `None` when missing, the record when unique, an error carrying the
    /// first match when ambiguous.
    pub fn into_unique(self, key: &str) -> Result<Option<GlobalValue>> {
        match self {
            KeyLookup::Missing => Ok(None),
            KeyLookup::Unique(record) => Ok(Some(record)),
            KeyLookup::Ambiguous { first, matches } => Err(Error::AmbiguousKey {
                kind: GlobalValue::PLURAL,
                key: key.to_string(),
                matches,
                first: Box::new(first),
            }),
        }
    }
}

impl GlobalValues {
    /// Look a global value up by its human-assigned key.
    ///
    /// Asks for at most two matches, which is enough to tell unique from
    /// ambiguous.
    pub async fn lookup_by_key(
        &self,
        ctx: &Context,
        key: &str,
    ) -> Result<KeyLookup<GlobalValue>> {
        let query = [("key", key), ("page_size", "2"), ("sort_field", "series_id")];
        let page: GlobalValuesQueryResponse = self
            .transport()
            .get(ctx, GlobalValue::COLLECTION, &query)
            .await?
            .into_parsed()
            .unwrap_or_default();

        let matches = page.total_items.max(page.page_items.len());
        let mut items = page.page_items.into_iter();
        Ok(match (items.next(), matches) {
            (None, _) => KeyLookup::Missing,
            (Some(only), 0 | 1) => KeyLookup::Unique(only),
            (Some(first), matches) => KeyLookup::Ambiguous { first, matches },
        })
    }

    /// Look a global value up by key, failing if more than one matches.
    ///
    /// The [`Error::AmbiguousKey`] returned for several matches still carries
    /// the first one; see [`Error::ambiguous_first`].
    pub async fn get_by_key(&self, ctx: &Context, key: &str) -> Result<Option<GlobalValue>> {
        self.lookup_by_key(ctx, key).await?.into_unique(key)
    }
}
