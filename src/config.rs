//! Configuration Module
//!
//! Handles loading and managing facade configuration from environment variables.

use std::env;

/// Facade configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: i64,
    /// First segment of the storage namespace
    pub base_dir: String,
    /// Second segment of the storage namespace
    pub init_dir: String,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_BASE_DIR` - Namespace base segment (default: "/bitrix/cache")
    /// - `CACHE_INIT_DIR` - Namespace init segment (default: empty)
    pub fn from_env() -> Self {
        Self {
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            base_dir: env::var("CACHE_BASE_DIR").unwrap_or_else(|_| "/bitrix/cache".to_string()),
            init_dir: env::var("CACHE_INIT_DIR").unwrap_or_default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: 3600,
            base_dir: "/bitrix/cache".to_string(),
            init_dir: String::new(),
        }
    }
}
