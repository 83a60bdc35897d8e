//! Proxy Routes
//!
//! Configures the Axum router. The proxy is transparent, so there are no
//! named routes: a single fallback handler receives every method and path
//! and forwards it according to the caching rules.

use axum::Router;
use tower_http::trace::TraceLayer;

use super::handler::{proxy_handler, AppState};

/// Creates the proxy router.
///
/// # Middleware
/// - Tracing: logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
