//! Session-wide cache kill switch.

use std::fmt;
use std::sync::Arc;

use crate::{SessionStorage, StorageResult, TRACING_TARGET_CACHE};

/// The `CACHE_DISABLED` flag persisted in session storage.
///
/// Unset by default. Setting it is an explicit developer action; it is
/// cleared together with the session storage. The flag is handed to
/// [`CacheStore`](crate::CacheStore) at construction instead of being read
/// from ambient state.
#[derive(Clone)]
pub struct SessionFlag {
    storage: Arc<dyn SessionStorage>,
}

impl fmt::Debug for SessionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFlag")
            .field("key", &Self::KEY)
            .finish_non_exhaustive()
    }
}

impl SessionFlag {
    /// Storage key holding the flag.
    pub const KEY: &'static str = "CACHE_DISABLED";

    /// Stored value meaning "set".
    const SET: &'static str = "1";

    /// Creates a flag backed by the given session storage.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Returns `true` if caching is disabled for the session.
    pub async fn is_set(&self) -> StorageResult<bool> {
        let value = self.storage.get_item(Self::KEY).await?;
        Ok(value.as_deref() == Some(Self::SET))
    }

    /// Disables caching for the rest of the session.
    pub async fn set(&self) -> StorageResult<()> {
        self.storage
            .set_item(Self::KEY, Self::SET.to_owned())
            .await?;
        tracing::info!(
            target: TRACING_TARGET_CACHE,
            "Caching disabled for this session"
        );
        Ok(())
    }

    /// Re-enables caching.
    pub async fn clear(&self) -> StorageResult<()> {
        self.storage.remove_item(Self::KEY).await?;
        tracing::info!(
            target: TRACING_TARGET_CACHE,
            "Caching re-enabled for this session"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;

    #[tokio::test]
    async fn test_flag_lifecycle() {
        let storage = Arc::new(MemoryStorage::new());
        let flag = SessionFlag::new(storage.clone());

        assert!(!flag.is_set().await.unwrap());

        flag.set().await.unwrap();
        assert!(flag.is_set().await.unwrap());

        storage.clear().await.unwrap();
        assert!(!flag.is_set().await.unwrap());
    }

    #[tokio::test]
    async fn test_other_values_do_not_count() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(SessionFlag::KEY, "0".into())
            .await
            .unwrap();

        let flag = SessionFlag::new(storage);
        assert!(!flag.is_set().await.unwrap());
    }
}
