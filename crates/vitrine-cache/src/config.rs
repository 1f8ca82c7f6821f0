//! Cache configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use vitrine_core::{Error, Result};

use crate::TRACING_TARGET_CACHE;

/// Default lifetime of cached responses: 5 minutes.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration for the session response cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct CacheConfig {
    /// Serve and store responses through the session cache
    #[cfg_attr(
        feature = "config",
        arg(
            long = "cache-enabled",
            env = "VITRINE_CACHE_ENABLED",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// Lifetime of cached responses in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "cache-ttl", env = "VITRINE_CACHE_TTL", default_value = "300")
    )]
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_enabled: default_cache_enabled(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl CacheConfig {
    /// Returns the TTL as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Set whether the cache is used.
    #[must_use]
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Set the TTL in seconds.
    #[must_use]
    pub fn with_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if caching is enabled with a zero TTL,
    /// since every entry would be expired on arrival.
    pub fn validate(&self) -> Result<()> {
        if self.cache_enabled && self.cache_ttl_secs == 0 {
            return Err(Error::configuration()
                .with_message("Cache TTL must be positive when caching is enabled"));
        }
        Ok(())
    }

    /// Logs the cache configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CACHE,
            enabled = self.cache_enabled,
            ttl_secs = self.cache_ttl_secs,
            "Cache configuration"
        );
    }
}
