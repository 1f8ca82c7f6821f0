//! Session-scoped key/value storage.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{StorageError, StorageResult, TRACING_TARGET_CACHE};

/// Async string key/value store living for one session.
///
/// Mirrors the browser `sessionStorage` contract: string keys, string
/// values, and writes that may be refused when the quota is exhausted.
#[async_trait::async_trait]
pub trait SessionStorage: Send + Sync {
    /// Reads the value stored under `key`.
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: String) -> StorageResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Lists every stored key.
    async fn keys(&self) -> StorageResult<Vec<String>>;

    /// Removes every key, ending the session.
    async fn clear(&self) -> StorageResult<()>;
}

/// In-process session storage with a byte quota.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Quota applied by [`MemoryStorage::new`], matching common browser limits.
    pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

    /// Creates an empty storage with the default quota.
    pub fn new() -> Self {
        Self::with_quota(Self::DEFAULT_QUOTA_BYTES)
    }

    /// Creates an empty storage holding at most `quota` bytes of keys and values.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: Arc::default(),
            quota: Some(quota),
        }
    }

    /// Creates an empty storage without a quota.
    pub fn unbounded() -> Self {
        Self {
            items: Arc::default(),
            quota: None,
        }
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Returns `true` if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn footprint<'a>(items: impl Iterator<Item = (&'a String, &'a String)>) -> usize {
    items.map(|(key, value)| key.len() + value.len()).sum()
}

#[async_trait::async_trait]
impl SessionStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> StorageResult<()> {
        let mut items = self.items.write().await;

        if let Some(quota) = self.quota {
            let others = footprint(items.iter().filter(|(k, _)| k.as_str() != key));
            let required = others + key.len() + value.len();
            if required > quota {
                tracing::debug!(
                    target: TRACING_TARGET_CACHE,
                    key = %key,
                    required,
                    quota,
                    "Session storage quota exceeded"
                );
                return Err(StorageError::QuotaExceeded { required, quota });
            }
        }

        items.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.items.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self.items.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn clear(&self) -> StorageResult<()> {
        self.items.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        storage.set_item("a", "1".into()).await.unwrap();

        assert_eq!(storage.get_item("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(storage.keys().await.unwrap(), vec!["a".to_string()]);

        storage.remove_item("a").await.unwrap();
        storage.remove_item("a").await.unwrap();
        assert!(storage.get_item("a").await.unwrap().is_none());
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_quota_counts_replacements_once() {
        let storage = MemoryStorage::with_quota(8);
        storage.set_item("k", "1234567".into()).await.unwrap();
        storage.set_item("k", "7654321".into()).await.unwrap();

        let error = storage.set_item("j", "x".into()).await.unwrap_err();
        assert!(matches!(
            error,
            StorageError::QuotaExceeded {
                required: 10,
                quota: 8
            }
        ));
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear_ends_session() {
        let storage = MemoryStorage::unbounded();
        storage.set_item("a", "1".into()).await.unwrap();
        storage.set_item("b", "2".into()).await.unwrap();
        storage.clear().await.unwrap();
        assert!(storage.is_empty().await);
    }
}
