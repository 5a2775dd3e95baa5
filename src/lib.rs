//! Strata - A layered cache engine
//!
//! Provides multi-tier caching with LRU eviction, TTL expiry, and
//! durable file-backed storage, plus an HTTP surface for remote callers.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{global, reset_global, SetOptions, TieredCache};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
