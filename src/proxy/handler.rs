//! Proxy Handler
//!
//! The single request handler implementing the HIT/MISS/pass-through
//! decision logic.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::error::{ProxyError, Result};
use crate::proxy::key::{derive_key, is_cacheable};

/// Cache outcome header added to every cache-eligible response.
const X_CACHE: &str = "x-cache";

/// Application state shared across all request handlers.
///
/// Constructed once at startup and cloned per request. Holds no mutable
/// in-process state of its own; everything shared lives behind the store,
/// which serializes its own access.
#[derive(Clone)]
pub struct AppState {
    /// Origin base URL, trailing slash already trimmed
    pub origin: String,
    /// Outbound HTTP client (connection pool, request timeout)
    pub client: reqwest::Client,
    /// Cache store consulted on the cacheable path
    pub store: Arc<dyn CacheStore>,
}

impl AppState {
    /// Creates a new AppState for the given origin, client and store.
    pub fn new(origin: impl Into<String>, client: reqwest::Client, store: Arc<dyn CacheStore>) -> Self {
        Self {
            origin: origin.into(),
            client,
            store,
        }
    }
}

/// Handler for every inbound request, regardless of method or path.
///
/// GET requests go through the cache; every other method is forwarded
/// to the origin uncached. Each request produces exactly one response,
/// with no retries on any path.
pub async fn proxy_handler(State(state): State<AppState>, req: Request) -> Result<Response> {
    if !is_cacheable(req.method()) {
        return forward_without_cache(&state, req).await;
    }

    let target = request_target(req.uri()).to_string();
    let key = derive_key(&target);

    // A store failure must never fail the request: log it and fall
    // through to the origin as if the entry were absent.
    match state.store.get(&key).await {
        Ok(Some(body)) => {
            debug!("cache hit: {}", target);
            return Ok(hit_response(body));
        }
        Ok(None) => debug!("cache miss: {}", target),
        Err(err) => warn!("cache lookup failed for {}, falling through to origin: {}", target, err),
    }

    forward_and_cache(&state, &target, &key).await
}

/// Forwards a cacheable request to the origin, caching the body on a
/// successful (exactly 200 OK) response.
///
/// The outbound URL reuses the exact path-and-query string the key was
/// derived from, so the key and the forwarded request cannot diverge.
async fn forward_and_cache(state: &AppState, target: &str, key: &str) -> Result<Response> {
    let url = origin_url(&state.origin, target)?;

    let resp = state
        .client
        .get(url)
        .send()
        .await
        .map_err(ProxyError::OriginUnreachable)?;

    let status = resp.status();
    let body = resp.bytes().await.map_err(ProxyError::OriginBody)?;

    // Only a plain 200 is a cacheable success; redirects, partial
    // content and errors are relayed but never stored.
    if status == StatusCode::OK {
        if let Err(err) = state.store.set(key, body.clone()).await {
            warn!("cache write failed for {}: {}", target, err);
        }
    }

    info!("proxied {} -> {} (miss)", target, status);
    Ok((status, [(X_CACHE, "MISS")], body).into_response())
}

/// Forwards a non-cacheable request verbatim: same method, same
/// path-and-query, same body. The cache is never consulted, so the
/// response carries no `X-Cache` header.
async fn forward_without_cache(state: &AppState, req: Request) -> Result<Response> {
    let method = req.method().clone();
    let target = request_target(req.uri()).to_string();
    let url = origin_url(&state.origin, &target)?;

    let body = axum::body::to_bytes(req.into_body(), usize::MAX)
        .await
        .map_err(|e| ProxyError::RequestBody(e.to_string()))?;

    let resp = state
        .client
        .request(method, url)
        .body(body)
        .send()
        .await
        .map_err(ProxyError::OriginUnreachable)?;

    let status = resp.status();
    let bytes = resp.bytes().await.map_err(ProxyError::OriginBody)?;

    info!("proxied {} -> {} (uncached)", target, status);
    Ok((status, bytes).into_response())
}

/// Builds the response for a cache hit.
fn hit_response(body: Bytes) -> Response {
    (StatusCode::OK, [(X_CACHE, "HIT")], Body::from(body)).into_response()
}

/// Builds and validates the outbound origin URL.
fn origin_url(origin: &str, target: &str) -> Result<reqwest::Url> {
    reqwest::Url::parse(&format!("{}{}", origin, target))
        .map_err(|e| ProxyError::InvalidTarget(e.to_string()))
}

/// Returns the request target (path plus query string) of a URI.
fn request_target(uri: &Uri) -> &str {
    uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use async_trait::async_trait;
    use axum::http::Method;
    use crate::error::StoreError;

    /// Store that fails every operation, for fail-open tests.
    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> std::result::Result<Option<Bytes>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn set(&self, _key: &str, _value: Bytes) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn clear(&self) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn close(&self) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
    }

    fn request(method: Method, uri: &str) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_hit_short_circuits_origin() {
        // Origin points at a closed port: any forward attempt would 502
        let store = Arc::new(MemoryStore::new(600));
        let key = derive_key("/posts/1");
        store.set(&key, Bytes::from_static(b"cached")).await.unwrap();

        let state = AppState::new("http://127.0.0.1:1", reqwest::Client::new(), store);
        let response = proxy_handler(State(state), request(Method::GET, "/posts/1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-cache").unwrap(), "HIT");
    }

    #[tokio::test]
    async fn test_unreachable_origin_maps_to_bad_gateway() {
        let store = Arc::new(MemoryStore::new(600));
        let state = AppState::new("http://127.0.0.1:1", reqwest::Client::new(), store);

        let err = proxy_handler(State(state), request(Method::GET, "/posts/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::OriginUnreachable(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_broken_store_falls_open_to_origin() {
        // Lookup fails, so the handler must try the origin (which is
        // closed here) instead of erroring out on the store itself.
        let state = AppState::new("http://127.0.0.1:1", reqwest::Client::new(), Arc::new(BrokenStore));

        let err = proxy_handler(State(state), request(Method::GET, "/posts/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::OriginUnreachable(_)));
    }

    #[tokio::test]
    async fn test_pass_through_skips_cache() {
        // Even with a cached entry for the same target, POST must not
        // consult the cache; the closed origin makes that observable.
        let store = Arc::new(MemoryStore::new(600));
        let key = derive_key("/posts/1");
        store.set(&key, Bytes::from_static(b"cached")).await.unwrap();

        let state = AppState::new("http://127.0.0.1:1", reqwest::Client::new(), store);
        let err = proxy_handler(State(state), request(Method::POST, "/posts/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::OriginUnreachable(_)));
    }

    #[test]
    fn test_request_target_includes_query() {
        let uri: Uri = "http://localhost/posts/1?page=2".parse().unwrap();
        assert_eq!(request_target(&uri), "/posts/1?page=2");

        let uri: Uri = "/posts/1".parse().unwrap();
        assert_eq!(request_target(&uri), "/posts/1");
    }

    #[test]
    fn test_origin_url_concatenation() {
        let url = origin_url("http://example.com", "/posts/1?page=2").unwrap();
        assert_eq!(url.as_str(), "http://example.com/posts/1?page=2");
    }
}
