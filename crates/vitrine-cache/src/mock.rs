//! Test doubles for the cache layer.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! vitrine-cache = { version = "...", features = ["test-utils"] }
//! ```

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use jiff::Timestamp;

use crate::{Clock, SessionStorage, StorageError, StorageResult};

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    /// Creates a clock reading `epoch_ms` milliseconds since the Unix epoch.
    pub fn new(epoch_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(epoch_ms),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let by = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.now_ms.fetch_add(by, Ordering::SeqCst);
    }

    /// Sets the clock to `epoch_ms`.
    pub fn set(&self, epoch_ms: i64) {
        self.now_ms.store(epoch_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millisecond(self.now_ms.load(Ordering::SeqCst))
            .unwrap_or(Timestamp::UNIX_EPOCH)
    }
}

/// Storage where every operation fails, as in a locked-down browser profile.
#[derive(Debug, Clone, Default)]
pub struct FailingStorage;

impl FailingStorage {
    fn refuse<T>() -> StorageResult<T> {
        Err(StorageError::unavailable("storage access denied"))
    }
}

#[async_trait::async_trait]
impl SessionStorage for FailingStorage {
    async fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
        Self::refuse()
    }

    async fn set_item(&self, _key: &str, _value: String) -> StorageResult<()> {
        Self::refuse()
    }

    async fn remove_item(&self, _key: &str) -> StorageResult<()> {
        Self::refuse()
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        Self::refuse()
    }

    async fn clear(&self) -> StorageResult<()> {
        Self::refuse()
    }
}
