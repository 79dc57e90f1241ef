//! Blueprint-specific operations

use super::{Blueprints, RawEntityService, require_body, series_path};
use crate::context::Context;
use crate::error::Result;
use crate::http::RawResponse;
use crate::types::{Blueprint, PatchedBlueprint, SeriesAddressed};

impl Blueprints {
    /// Change the publication state only, producing a new version.
    pub async fn patch(&self, ctx: &Context, patch: &PatchedBlueprint) -> Result<Blueprint> {
        self.with_raw_response()
            .patch(ctx, patch)
            .await
            .map(RawResponse::into_parsed)
    }
}

impl RawEntityService<'_, Blueprint> {
    /// Change the publication state only, producing a new version.
    pub async fn patch(
        &self,
        ctx: &Context,
        patch: &PatchedBlueprint,
    ) -> Result<RawResponse<Blueprint>> {
        let path = series_path::<Blueprint>(patch.series_id())?;
        let raw = self.transport().patch(ctx, &path, patch).await?;
        require_body(self.transport(), http::Method::PATCH, &path, raw)
    }
}
