//! Entity services
//!
//! One [`EntityService`] per entity kind, all sharing a single
//! [`Transport`]. Every addressable operation keys off the series id, so
//! callers never need to track version-specific ids.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::{RawResponse, Transport};
use crate::types::{
    Blueprint, BlueprintTemplate, ContextQuestion, GlobalValue, Guardrail, NewBlueprint,
    NewBlueprintTemplate, NewContextQuestion, NewGlobalValue, NewGuardrail, SeriesAddressed,
    UpdatedBlueprint, UpdatedBlueprintTemplate, UpdatedContextQuestion, UpdatedGlobalValue,
    UpdatedGuardrail, Versioned,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub use global_values::KeyLookup;
pub use system::SystemService;

mod blueprints;
mod global_values;
mod system;

/// An entity kind served under `{base_path}/{COLLECTION}`.
pub trait Entity: DeserializeOwned + Versioned + Send + Sync + 'static {
    /// Collection path segment, e.g. `blueprints`.
    const COLLECTION: &'static str;
    /// Plural name used in messages.
    const PLURAL: &'static str;
    /// Create payload.
    type New: Serialize + Send + Sync;
    /// Full-replace payload.
    type Update: Serialize + SeriesAddressed + Send + Sync;
}

impl Entity for Blueprint {
    const COLLECTION: &'static str = "blueprints";
    const PLURAL: &'static str = "blueprints";
    type New = NewBlueprint;
    type Update = UpdatedBlueprint;
}

impl Entity for BlueprintTemplate {
    const COLLECTION: &'static str = "blueprint-templates";
    const PLURAL: &'static str = "blueprint templates";
    type New = NewBlueprintTemplate;
    type Update = UpdatedBlueprintTemplate;
}

impl Entity for ContextQuestion {
    const COLLECTION: &'static str = "context-questions";
    const PLURAL: &'static str = "context questions";
    type New = NewContextQuestion;
    type Update = UpdatedContextQuestion;
}

impl Entity for Guardrail {
    const COLLECTION: &'static str = "guardrails";
    const PLURAL: &'static str = "guardrails";
    type New = NewGuardrail;
    type Update = UpdatedGuardrail;
}

impl Entity for GlobalValue {
    const COLLECTION: &'static str = "presets";
    const PLURAL: &'static str = "global values";
    type New = NewGlobalValue;
    type Update = UpdatedGlobalValue;
}

/// Blueprint service.
pub type Blueprints = EntityService<Blueprint>;
/// Blueprint template service.
pub type BlueprintTemplates = EntityService<BlueprintTemplate>;
/// Context question service.
pub type ContextQuestions = EntityService<ContextQuestion>;
/// Guardrail service.
pub type Guardrails = EntityService<Guardrail>;
/// Global value service.
pub type GlobalValues = EntityService<GlobalValue>;

/// CRUD-with-versioning operations for one entity kind.
///
/// Any transport or API error is returned unchanged; a 404 on a fetch shows
/// up as an error whose [`Error::is_not_found`] is `true`.
pub struct EntityService<K> {
    transport: Arc<Transport>,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for EntityService<K> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            _kind: PhantomData,
        }
    }
}

impl<K> fmt::Debug for EntityService<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityService")
            .field("collection", &std::any::type_name::<K>())
            .finish()
    }
}

impl<K: Entity> EntityService<K> {
    /// Create a service on a shared transport.
    pub fn new(transport: Arc<Transport>) -> Self {
        Self {
            transport,
            _kind: PhantomData,
        }
    }

    /// Fetch the latest version of a series.
    pub async fn get_by_series_id(&self, ctx: &Context, series_id: &str) -> Result<K> {
        self.with_raw_response()
            .get_by_series_id(ctx, series_id)
            .await
            .map(RawResponse::into_parsed)
    }

    /// Create a new series at version 1.
    pub async fn create(&self, ctx: &Context, new: &K::New) -> Result<K> {
        self.with_raw_response()
            .create(ctx, new)
            .await
            .map(RawResponse::into_parsed)
    }

    /// Replace every caller-controlled field, producing a new version.
    pub async fn update(&self, ctx: &Context, update: &K::Update) -> Result<K> {
        self.with_raw_response()
            .update(ctx, update)
            .await
            .map(RawResponse::into_parsed)
    }

    /// Delete the whole series.
    pub async fn delete(&self, ctx: &Context, series_id: &str) -> Result<()> {
        self.with_raw_response()
            .delete(ctx, series_id)
            .await
            .map(RawResponse::into_parsed)
    }

    /// Variant of this service whose calls also return HTTP metadata.
    pub fn with_raw_response(&self) -> RawEntityService<'_, K> {
        RawEntityService { service: self }
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }
}

/// [`EntityService`] operations returning the [`RawResponse`].
#[derive(Debug)]
pub struct RawEntityService<'a, K> {
    service: &'a EntityService<K>,
}

impl<K: Entity> RawEntityService<'_, K> {
    /// Fetch the latest version of a series.
    pub async fn get_by_series_id(
        &self,
        ctx: &Context,
        series_id: &str,
    ) -> Result<RawResponse<K>> {
        let path = series_path::<K>(series_id)?;
        let raw = self.transport().get(ctx, &path, &[]).await?;
        require_body(self.transport(), http::Method::GET, &path, raw)
    }

    /// Create a new series at version 1.
    pub async fn create(&self, ctx: &Context, new: &K::New) -> Result<RawResponse<K>> {
        let raw = self.transport().post(ctx, K::COLLECTION, new).await?;
        require_body(self.transport(), http::Method::POST, K::COLLECTION, raw)
    }

    /// Replace every caller-controlled field, producing a new version.
    pub async fn update(&self, ctx: &Context, update: &K::Update) -> Result<RawResponse<K>> {
        let path = series_path::<K>(update.series_id())?;
        let raw = self.transport().put(ctx, &path, update).await?;
        require_body(self.transport(), http::Method::PUT, &path, raw)
    }

    /// Delete the whole series.
    pub async fn delete(&self, ctx: &Context, series_id: &str) -> Result<RawResponse<()>> {
        let path = series_path::<K>(series_id)?;
        self.transport().delete(ctx, &path).await
    }

    fn transport(&self) -> &Transport {
        self.service.transport()
    }
}

/// `{COLLECTION}/series/{series_id}`.
///
/// The id must stay a single path segment once resolved against the base
/// URL: dot segments and characters that end or escape a segment are
/// rejected.
pub(crate) fn series_path<K: Entity>(series_id: &str) -> Result<String> {
    let dot_segment = matches!(series_id, "." | "..");
    let escapes_segment = series_id
        .chars()
        .any(|c| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_control());
    if series_id.is_empty() || dot_segment || escapes_segment {
        return Err(Error::InvalidUrl(format!(
            "invalid {} series id: {:?}",
            K::COLLECTION,
            series_id
        )));
    }
    Ok(format!("{}/series/{}", K::COLLECTION, series_id))
}

/// A write or fetch that answers 2xx with no body has nothing to return.
pub(crate) fn require_body<T>(
    transport: &Transport,
    method: http::Method,
    path: &str,
    raw: RawResponse<Option<T>>,
) -> Result<RawResponse<T>> {
    raw.try_map(|parsed| {
        parsed.ok_or_else(|| match transport.endpoint(path, &[]) {
            Ok(url) => Error::EmptyBody { method, url },
            Err(err) => err,
        })
    })
}
