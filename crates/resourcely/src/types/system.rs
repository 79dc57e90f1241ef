//! System endpoints

use serde::{Deserialize, Serialize};

/// Body of `GET system/health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemHealth {
    /// `"ok"` when the API is available
    pub status: String,
}

impl SystemHealth {
    /// Whether the API reported itself available.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
