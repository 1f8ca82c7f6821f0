#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for cache store operations.
///
/// Use this target for logging hits, misses, expiry and absorbed storage errors.
pub const TRACING_TARGET_CACHE: &str = "vitrine_cache::store";

/// Tracing target for fetch operations.
///
/// Use this target for logging requests, status failures and decode failures.
pub const TRACING_TARGET_FETCH: &str = "vitrine_cache::fetch";

mod clock;
mod config;
mod entry;
mod error;
mod fetcher;
mod flag;
mod storage;
mod store;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use clock::{Clock, SystemClock};
pub use config::CacheConfig;
pub use entry::CacheEntry;
pub use error::{StorageError, StorageResult};
pub use fetcher::{FetchOptions, Fetcher};
pub use flag::SessionFlag;
pub use storage::{MemoryStorage, SessionStorage};
pub use store::CacheStore;
