//! # Resourcely
//!
//! Typed client and state-reconciliation core for the Resourcely REST API:
//! - Authenticated JSON transport with retries and cancellation
//! - Structured errors for every non-2xx response
//! - Versioned CRUD for blueprints, blueprint templates, context questions,
//!   guardrails and global values
//! - Update planning for kinds that split writes across `PUT` and `PATCH`
//! - JSON equivalence so reformatted JSON is not reported as a change
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resourcely::{Client, ClientConfig, Context};
//! use resourcely::reconcile::{BlueprintState, Planned};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = Context::background();
//!     let client = Client::connect(ClientConfig::from_env()?, &ctx, &["acme"]).await?;
//!
//!     let blueprint = client.blueprints().get_by_series_id(&ctx, "0c8d...").await?;
//!     let observed = BlueprintState::from_record(&blueprint);
//!     let desired = BlueprintState {
//!         is_published: Planned::Known(true),
//!         ..observed.clone()
//!     };
//!
//!     if let Some(plan) = observed.plan_update(&desired, &blueprint.series_id) {
//!         let applied = plan.apply(&ctx, client.blueprints()).await?;
//!         println!("now at version {}", applied.record.version);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use context::{CancelHandle, Context};
pub use error::{ApiError, Error, ErrorEnvelope, Result};
pub use crate::http::RawResponse;
pub use types::*;

// Module declarations
pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod observability;
pub mod reconcile;
pub mod resources;
pub mod types;

// Re-export the shared building blocks
pub use resourcely_core::json::{self, JsonString, is_equivalent};
pub use resourcely_core::retry::{ExponentialBackoff, RetryPolicy};

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use resourcely::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Client, ClientConfig, Context, Error, JsonString, Result,
        reconcile::{
            AppliedUpdate, BlueprintState, Planned, SplitUpdate, UpdateActions,
            resolve_update_actions, stabilize_json,
        },
        resources::KeyLookup,
        types::{
            Blueprint, BlueprintTemplate, ContextQuestion, GlobalValue, Guardrail, SeriesAddressed,
            Versioned,
        },
    };
}

/// SDK version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Versioned path prefix of every API endpoint
pub const DEFAULT_BASE_PATH: &str = "api/v1";

/// Project home, advertised in the user agent
pub const PROJECT_URL: &str = "https://github.com/Resourcely-Inc/resourcely-rust";

/// The `User-Agent` sent when none is configured.
pub fn default_user_agent() -> String {
    format!("resourcely-rust/{VERSION} (+{PROJECT_URL})")
}

/// Install a `fmt` subscriber logging this crate's `debug` events.
///
/// Hosts with their own subscriber should not call this.
#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|e| Error::Other(anyhow::anyhow!(e)))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_default_user_agent() {
        assert_eq!(
            default_user_agent(),
            format!("resourcely-rust/{VERSION} (+https://github.com/Resourcely-Inc/resourcely-rust)")
        );
    }
}
