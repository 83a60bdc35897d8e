//! Cache Key Module
//!
//! Request classification and deterministic cache key derivation.

use axum::http::Method;
use sha2::{Digest, Sha256};

// == Classify ==
/// Decides whether a request participates in the cache.
///
/// Only the idempotent read verb is cacheable; caching a mutating
/// request would serve stale side-effect results to later callers.
pub fn is_cacheable(method: &Method) -> bool {
    method == Method::GET
}

// == Derive Key ==
/// Derives the cache key for a request target (path plus query string).
///
/// Pure function of its input: identical targets always produce the same
/// key, within and across process restarts. SHA-256 keeps distinct
/// targets from colliding and bounds arbitrarily long URLs to a
/// 64-character lowercase hex key.
pub fn derive_key(request_target: &str) -> String {
    let digest = Sha256::digest(request_target.as_bytes());
    hex::encode(digest)
}
