//! Error types for the cache lab
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Lab Error Enum ==
/// Unified error type for the cache and the load generator.
#[derive(Error, Debug)]
pub enum LabError {
    /// Unrecognized eviction policy name
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Unrecognized arrival distribution name
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    /// A load run is already active
    #[error("Load generator is already running")]
    AlreadyRunning,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The content collaborator failed on a miss (timeout, status, transport)
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    /// The store could not be reached within the lock timeout
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Invalid startup configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for LabError {
    fn into_response(self) -> Response {
        let status = match &self {
            LabError::InvalidPolicy(_)
            | LabError::InvalidDistribution(_)
            | LabError::AlreadyRunning
            | LabError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            LabError::UpstreamFetch(_) => StatusCode::BAD_GATEWAY,
            LabError::CacheUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LabError::Config(_) | LabError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for LabError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LabError::UpstreamFetch(format!("request timed out: {}", err))
        } else {
            LabError::UpstreamFetch(err.to_string())
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache lab.
pub type Result<T> = std::result::Result<T, LabError>;
