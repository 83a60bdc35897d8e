//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;

use crate::error::ConfigError;

/// Proxy configuration parameters.
///
/// Loaded once at startup and immutable for the process lifetime. The
/// origin URL is required; everything else falls back to a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the origin server (trailing slash trimmed)
    pub origin_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// Fixed TTL in seconds applied to every cache entry
    pub cache_ttl: u64,
    /// Whether to clear the cache store once before serving
    pub clear_cache: bool,
    /// Expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Timeout in seconds for outbound origin requests
    pub origin_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ORIGIN_URL` - Origin base URL (required; fatal if absent or unparseable)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL` - Entry TTL in seconds (default: 600)
    /// - `CLEAR_CACHE` - Clear the store before serving (default: false)
    /// - `CLEANUP_INTERVAL` - Expiry sweep interval in seconds (default: 60)
    /// - `ORIGIN_TIMEOUT` - Outbound request timeout in seconds (default: 30)
    ///
    /// Optional variables that fail to parse fall back to their default.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        let origin_url = env::var("ORIGIN_URL").map_err(|_| ConfigError::MissingVar("ORIGIN_URL"))?;
        let origin_url = normalize_origin(&origin_url)?;

        Ok(Self {
            origin_url,
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            clear_cache: env::var("CLEAR_CACHE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            origin_timeout: env::var("ORIGIN_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        })
    }
}

/// Validates the origin base URL and trims any trailing slash.
///
/// The trailing slash is trimmed so that concatenating the inbound
/// request target (which always starts with `/`) never yields `//`.
fn normalize_origin(raw: &str) -> std::result::Result<String, ConfigError> {
    let trimmed = raw.trim_end_matches('/');

    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidVar("ORIGIN_URL", e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidVar(
            "ORIGIN_URL",
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }

    Ok(trimmed.to_string())
}
