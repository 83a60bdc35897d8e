//! Caching Proxy - A transparent caching HTTP reverse proxy
//!
//! Serves repeated GET requests from a fixed-TTL cache and forwards
//! everything else straight through to the origin.

pub mod cache;
pub mod config;
pub mod error;
pub mod proxy;
pub mod tasks;

pub use config::Config;
pub use proxy::AppState;
pub use tasks::spawn_cleanup_task;
