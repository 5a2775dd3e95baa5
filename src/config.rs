//! Configuration Module
//!
//! Handles loading and managing engine configuration from environment
//! variables.

use std::env;
use std::path::PathBuf;

/// Engine and server configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. Configuration is honored once, at first construction of
/// the engine; later changes have no effect on a running instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the fast tier can hold
    pub fast_tier_max_entries: usize,
    /// Fast tier byte budget in MB; recorded but not consulted by the
    /// entry-count eviction algorithm
    pub fast_tier_max_size_mb: u64,
    /// Whether the session-scoped tier participates
    pub scoped_tier_enabled: bool,
    /// Whether the durable file-backed tier participates
    pub durable_tier_enabled: bool,
    /// Directory holding durable entry files
    pub durable_tier_directory: PathBuf,
    /// Durable tier byte budget in MB
    pub durable_tier_max_size_mb: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FAST_TIER_MAX_ENTRIES` - Fast tier capacity (default: 500)
    /// - `FAST_TIER_MAX_SIZE_MB` - Fast tier byte budget, unused by eviction (default: 50)
    /// - `SCOPED_TIER_ENABLED` - Enable the scoped tier (default: true)
    /// - `DURABLE_TIER_ENABLED` - Enable the durable tier (default: true)
    /// - `DURABLE_TIER_DIRECTORY` - Durable entry directory (default: cache_data)
    /// - `DURABLE_TIER_MAX_SIZE_MB` - Durable byte budget (default: 100)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fast_tier_max_entries: env_parsed("FAST_TIER_MAX_ENTRIES")
                .unwrap_or(defaults.fast_tier_max_entries),
            fast_tier_max_size_mb: env_parsed("FAST_TIER_MAX_SIZE_MB")
                .unwrap_or(defaults.fast_tier_max_size_mb),
            scoped_tier_enabled: env_parsed("SCOPED_TIER_ENABLED")
                .unwrap_or(defaults.scoped_tier_enabled),
            durable_tier_enabled: env_parsed("DURABLE_TIER_ENABLED")
                .unwrap_or(defaults.durable_tier_enabled),
            durable_tier_directory: env::var("DURABLE_TIER_DIRECTORY")
                .map(PathBuf::from)
                .unwrap_or(defaults.durable_tier_directory),
            durable_tier_max_size_mb: env_parsed("DURABLE_TIER_MAX_SIZE_MB")
                .unwrap_or(defaults.durable_tier_max_size_mb),
            server_port: env_parsed("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: env_parsed("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fast_tier_max_entries: 500,
            fast_tier_max_size_mb: 50,
            scoped_tier_enabled: true,
            durable_tier_enabled: true,
            durable_tier_directory: PathBuf::from("cache_data"),
            durable_tier_max_size_mb: 100,
            server_port: 3000,
            cleanup_interval: 60,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
