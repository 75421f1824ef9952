//! Response type for the health endpoints.

use serde::{Deserialize, Serialize};

/// Response body for `GET /`, `GET /health` and `GET /healthz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"pass"` when the server answers.
    pub status: String,
    /// Toolchain version text, empty if the version query failed.
    pub version: String,
}

impl HealthResponse {
    pub fn pass(version: String) -> Self {
        HealthResponse {
            status: "pass".to_string(),
            version,
        }
    }
}
