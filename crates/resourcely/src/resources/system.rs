//! System endpoints

use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::SystemHealth;
use std::sync::Arc;

/// Service for `system/*` endpoints.
#[derive(Debug, Clone)]
pub struct SystemService {
    transport: Arc<Transport>,
}

impl SystemService {
    /// Create a service on a shared transport.
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// `GET system/health`.
    pub async fn health(&self, ctx: &Context) -> Result<SystemHealth> {
        let path = "system/health";
        self.transport
            .get(ctx, path, &[])
            .await?
            .into_parsed()
            .ok_or_else(|| match self.transport.endpoint(path, &[]) {
                Ok(url) => Error::EmptyBody {
                    method: http::Method::GET,
                    url,
                },
                Err(err) => err,
            })
    }
}
