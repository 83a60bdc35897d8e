//! Error types for the caching proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Config Error Enum ==
/// Startup configuration errors. All of these are fatal: the process
/// must not begin serving with a broken configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is missing
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    /// An environment variable holds an unusable value
    #[error("environment variable {0} has an invalid value: {1}")]
    InvalidVar(&'static str, String),
}

// == Store Error Enum ==
/// Errors from the cache store backend.
///
/// "Key not found" is NOT an error: store lookups return `Ok(None)` for
/// absent entries so the router can tell an empty cache apart from a
/// broken one. Store errors never surface to the client; the router
/// logs them and falls open toward the origin.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

// == Proxy Error Enum ==
/// Per-request errors produced by the request router.
///
/// Each variant maps to the single error response relayed to the client;
/// none of them affect other in-flight requests or the process itself.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The origin base plus request target did not form a valid URL
    #[error("invalid upstream target: {0}")]
    InvalidTarget(String),

    /// The inbound request body could not be read
    #[error("failed to read request body: {0}")]
    RequestBody(String),

    /// The origin could not be reached at the transport level
    #[error("origin unreachable: {0}")]
    OriginUnreachable(#[source] reqwest::Error),

    /// The origin responded but its body could not be read in full
    #[error("failed to read origin response: {0}")]
    OriginBody(#[source] reqwest::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::RequestBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::OriginUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::OriginBody(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for per-request proxy errors.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_target_maps_to_bad_request() {
        let response = ProxyError::InvalidTarget("not a url".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }
}
