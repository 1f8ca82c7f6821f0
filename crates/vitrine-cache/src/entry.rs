//! Stored cache entries.

use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StorageResult;

/// A cached response as persisted in session storage.
///
/// Serialized as `{ storedAtEpochMs, ttlMs, value }`; the key is the
/// storage key itself and is not repeated in the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    #[serde(skip)]
    pub key: String,
    pub stored_at_epoch_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_ms: Option<u64>,
    pub value: Value,
}

impl CacheEntry {
    /// Creates an entry stored at `stored_at` with the given TTL.
    pub fn new(key: impl Into<String>, value: Value, stored_at: Timestamp, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            stored_at_epoch_ms: stored_at.as_millisecond(),
            ttl_ms: Some(millis(ttl)),
            value,
        }
    }

    /// Decodes the entry stored under `key`.
    pub fn decode(key: &str, raw: &str) -> StorageResult<Self> {
        let mut entry: Self = serde_json::from_str(raw)?;
        entry.key = key.to_owned();
        Ok(entry)
    }

    /// Encodes the entry for session storage.
    pub fn encode(&self) -> StorageResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// TTL recorded when the entry was written, if any.
    pub fn stored_ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }

    /// Milliseconds elapsed between storing the entry and `now`.
    pub fn age_ms(&self, now: Timestamp) -> i128 {
        i128::from(now.as_millisecond()) - i128::from(self.stored_at_epoch_ms)
    }

    /// An entry is fresh iff `now - storedAt < ttl`; equality is expired.
    pub fn is_fresh(&self, now: Timestamp, ttl: Duration) -> bool {
        let ttl_ms = i128::try_from(ttl.as_millis()).unwrap_or(i128::MAX);
        self.age_ms(now) < ttl_ms
    }
}

/// Whole milliseconds of `duration`, saturating at `u64::MAX`.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
