//! TTL-validated response cache over session storage.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use vitrine_core::Collection;

use crate::config::DEFAULT_CACHE_TTL_SECS;
use crate::entry::millis;
use crate::{
    CacheEntry, Clock, SessionFlag, SessionStorage, StorageResult, SystemClock,
    TRACING_TARGET_CACHE,
};

/// Session-scoped response cache.
///
/// Every read and write fails soft: storage and decode failures are logged
/// at `warn` and reported as a miss (for reads) or swallowed (for writes).
/// While the session flag is set, reads report absent and writes are
/// skipped; stored entries are left alone so the switch is reversible.
#[derive(Clone)]
pub struct CacheStore {
    storage: Arc<dyn SessionStorage>,
    flag: SessionFlag,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
    tracked: Arc<RwLock<BTreeSet<String>>>,
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("flag", &self.flag)
            .field("clock", &self.clock)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Creates a store over `storage`, gated by `flag`.
    pub fn new(storage: Arc<dyn SessionStorage>, flag: SessionFlag) -> Self {
        Self {
            storage,
            flag,
            clock: Arc::new(SystemClock),
            default_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            tracked: Arc::default(),
        }
    }

    /// Creates a store whose flag lives in the same storage.
    pub fn with_storage(storage: Arc<dyn SessionStorage>) -> Self {
        let flag = SessionFlag::new(storage.clone());
        Self::new(storage, flag)
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// TTL applied to entries that were stored without one.
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Returns the session flag gating this store.
    pub fn flag(&self) -> &SessionFlag {
        &self.flag
    }

    /// Returns `true` while caching is disabled for the session.
    ///
    /// An unreadable flag counts as disabled.
    pub async fn is_disabled(&self) -> bool {
        match self.flag.is_set().await {
            Ok(disabled) => disabled,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_CACHE,
                    error = %error,
                    "Cannot read cache flag, treating cache as disabled"
                );
                true
            }
        }
    }

    /// Reads `key`, validated against the TTL stored with the entry.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CACHE)]
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.lookup(key, None).await
    }

    /// Reads `key`, validated against `ttl` instead of the stored TTL.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CACHE)]
    pub async fn get_with_ttl(&self, key: &str, ttl: Duration) -> Option<Value> {
        self.lookup(key, Some(ttl)).await
    }

    async fn lookup(&self, key: &str, ttl: Option<Duration>) -> Option<Value> {
        if self.is_disabled().await {
            tracing::debug!(target: TRACING_TARGET_CACHE, key = %key, "Cache disabled, skipping read");
            return None;
        }

        let raw = match self.storage.get_item(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(target: TRACING_TARGET_CACHE, key = %key, "Cache miss");
                return None;
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_CACHE,
                    key = %key,
                    error = %error,
                    "Cache read failed"
                );
                return None;
            }
        };

        let entry = match CacheEntry::decode(key, &raw) {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_CACHE,
                    key = %key,
                    error = %error,
                    "Corrupt cache entry"
                );
                return None;
            }
        };

        let ttl = ttl
            .or_else(|| entry.stored_ttl())
            .unwrap_or(self.default_ttl);
        let now = self.clock.now();

        if !entry.is_fresh(now, ttl) {
            tracing::debug!(
                target: TRACING_TARGET_CACHE,
                key = %key,
                age_ms = %entry.age_ms(now),
                ttl_ms = millis(ttl),
                "Cache entry expired"
            );
            self.remove(key).await;
            return None;
        }

        tracing::debug!(target: TRACING_TARGET_CACHE, key = %key, "Cache hit");
        Some(entry.value)
    }

    /// Stores `value` under `key` for `ttl`.
    ///
    /// Skipped while the cache is disabled. Quota and serialization
    /// failures are logged and swallowed.
    #[tracing::instrument(skip(self, value), target = TRACING_TARGET_CACHE)]
    pub async fn put(&self, key: &str, value: &Value, ttl: Duration) {
        if self.is_disabled().await {
            tracing::debug!(target: TRACING_TARGET_CACHE, key = %key, "Cache disabled, skipping write");
            return;
        }

        let entry = CacheEntry::new(key, value.clone(), self.clock.now(), ttl);
        let encoded = match entry.encode() {
            Ok(encoded) => encoded,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_CACHE,
                    key = %key,
                    error = %error,
                    "Cannot encode cache entry"
                );
                return;
            }
        };

        self.tracked.write().await.insert(key.to_owned());

        match self.storage.set_item(key, encoded).await {
            Ok(()) => {
                tracing::debug!(
                    target: TRACING_TARGET_CACHE,
                    key = %key,
                    ttl_ms = millis(ttl),
                    "Cached value"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_CACHE,
                    key = %key,
                    error = %error,
                    "Cache write failed"
                );
            }
        }
    }

    /// Removes `key` from the cache.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CACHE)]
    pub async fn invalidate(&self, key: &str) {
        self.remove(key).await;
        self.tracked.write().await.remove(key);
    }

    /// Keys written through this store during the session.
    pub async fn tracked_keys(&self) -> Vec<String> {
        self.tracked.read().await.iter().cloned().collect()
    }

    /// Developer action: drops every collection and detail entry, then
    /// disables caching for the rest of the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session flag cannot be written. Failures to
    /// remove individual entries are only logged.
    pub async fn clear_and_disable(&self) -> StorageResult<()> {
        let tracked: Vec<String> = std::mem::take(&mut *self.tracked.write().await)
            .into_iter()
            .collect();

        let keys: BTreeSet<&str> = Collection::cache_keys()
            .map(|key| -> &str { key })
            .chain(tracked.iter().map(String::as_str))
            .collect();

        for key in &keys {
            self.remove(key).await;
        }

        tracing::info!(
            target: TRACING_TARGET_CACHE,
            removed = keys.len(),
            "Cleared cached responses"
        );

        self.flag.set().await
    }

    /// Re-enables caching after [`CacheStore::clear_and_disable`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session flag cannot be removed.
    pub async fn enable(&self) -> StorageResult<()> {
        self.flag.clear().await
    }

    async fn remove(&self, key: &str) {
        if let Err(error) = self.storage.remove_item(key).await {
            tracing::warn!(
                target: TRACING_TARGET_CACHE,
                key = %key,
                error = %error,
                "Cache delete failed"
            );
        }
    }
}
