//! Proxy Module
//!
//! The request-routing and caching decision engine.
//!
//! # Per-request pipeline
//! - Classify the method: only GET participates in the cache
//! - Derive a deterministic key from the request path and query
//! - Serve a HIT from the store, or forward to the origin on a MISS
//! - Relay the origin's status and body, tagging `X-Cache`
//!
//! Mutating methods bypass the cache entirely and are forwarded verbatim.

pub mod handler;
pub mod key;
pub mod routes;


pub use handler::AppState;
pub use key::{derive_key, is_cacheable};
pub use routes::create_router;
