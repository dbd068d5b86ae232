//! API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to plan a trip.
#[derive(Debug, Clone, Deserialize)]
pub struct TravelRequest {
    /// The user's trip-planning query
    #[serde(default)]
    pub query: Option<String>,
}

/// Successful trip-planning response.
#[derive(Debug, Clone, Serialize)]
pub struct TravelResponse {
    /// The structured trip payload produced by the agent
    pub response: Value,
}

/// Error payload for 4xx/5xx responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
