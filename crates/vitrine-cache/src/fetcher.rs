//! Caching JSON fetch layer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;
use vitrine_core::{Collection, ContentTransport, Entity, Error, MemberLookup, Result};

use crate::{CacheConfig, CacheStore, TRACING_TARGET_FETCH};

/// Per-request caching options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Session storage key; without one the response is never cached.
    pub cache_key: Option<String>,
    /// Lifetime of the stored response.
    pub ttl: Duration,
    /// Read from and write to the cache.
    pub use_cache: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            cache_key: None,
            ttl: Duration::from_secs(5 * 60),
            use_cache: true,
        }
    }
}

impl FetchOptions {
    /// Options caching the response under `key`.
    pub fn cached(key: impl Into<String>) -> Self {
        Self::default().with_cache_key(key)
    }

    /// Set the cache key.
    #[must_use]
    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Set the TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set whether the cache is consulted.
    #[must_use]
    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    fn cache_key(&self) -> Option<&str> {
        self.cache_key.as_deref().filter(|_| self.use_cache)
    }
}

/// Fetches JSON documents from the content API through the session cache.
///
/// Each call issues at most one GET request: no retry, no timeout, and no
/// deduplication of concurrent calls for the same key.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn ContentTransport>,
    cache: CacheStore,
    origin: Url,
    config: CacheConfig,
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("origin", &self.origin.as_str())
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    /// Creates a fetcher for the API at `origin`.
    pub fn new(transport: Arc<dyn ContentTransport>, cache: CacheStore, origin: Url) -> Self {
        Self {
            transport,
            cache,
            origin,
            config: CacheConfig::default(),
        }
    }

    /// Applies cache configuration to collection and member lookups.
    #[must_use]
    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the API origin.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Returns the underlying cache store.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Fetches `url` and decodes the body as JSON.
    ///
    /// A valid cache hit returns without touching the network. On success
    /// the value is cached before it is returned.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Network`](vitrine_core::ErrorKind::Network) if the request cannot complete.
    /// - [`ErrorKind::HttpStatus`](vitrine_core::ErrorKind::HttpStatus) for non-2xx responses; nothing is cached.
    /// - [`ErrorKind::Decode`](vitrine_core::ErrorKind::Decode) if the body is not JSON.
    pub async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<Value> {
        let cache_key = options.cache_key().filter(|_| self.config.cache_enabled);

        if let Some(key) = cache_key
            && let Some(value) = self.cache.get_with_ttl(key, options.ttl).await
        {
            tracing::debug!(target: TRACING_TARGET_FETCH, url = %url, key = %key, "Served from cache");
            return Ok(value);
        }

        tracing::debug!(target: TRACING_TARGET_FETCH, url = %url, "Fetching");
        let response = self.transport.get(url).await?;

        if !response.is_success() {
            tracing::warn!(
                target: TRACING_TARGET_FETCH,
                url = %url,
                status = response.status,
                "Request failed"
            );
            return Err(Error::http_status(url.as_str(), response.status));
        }

        let value: Value = serde_json::from_slice(&response.body).map_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET_FETCH,
                url = %url,
                error = %error,
                "Response body is not JSON"
            );
            Error::from(error).with_url(url.as_str())
        })?;

        if let Some(key) = cache_key {
            self.cache.put(key, &value, options.ttl).await;
        }

        Ok(value)
    }

    /// Fetches every record of `collection`.
    ///
    /// # Errors
    ///
    /// Propagates fetch errors, and returns a decode error if the response
    /// has no `data` member.
    pub async fn fetch_collection(&self, collection: Collection) -> Result<Vec<Entity>> {
        let url = collection.endpoint(&self.origin)?;
        let options = FetchOptions::cached(collection.cache_key()).with_ttl(self.config.ttl());
        let response = self.fetch(&url, &options).await?;
        let entities = Entity::list_from_response(&response)?;

        tracing::debug!(
            target: TRACING_TARGET_FETCH,
            collection = %collection,
            count = entities.len(),
            "Fetched collection"
        );
        Ok(entities)
    }

    /// Fetches a single team member by page identifier, such as `jane-doe`.
    ///
    /// # Errors
    ///
    /// Propagates fetch errors, and returns a decode error if the response
    /// has no `data` member.
    pub async fn fetch_member(&self, identifier: &str) -> Result<Option<Entity>> {
        let lookup = MemberLookup::from_identifier(identifier);
        let url = lookup.endpoint(&self.origin)?;
        let options = FetchOptions::cached(lookup.cache_key()).with_ttl(self.config.ttl());
        let response = self.fetch(&url, &options).await?;
        Entity::first_from_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vitrine_core::ErrorKind;
    use vitrine_core::mock::MockTransport;

    use super::*;
    use crate::mock::ManualClock;
    use crate::{MemoryStorage, SessionStorage};

    const ORIGIN: &str = "http://localhost:1337";
    const PRODUCTS: &str = "http://localhost:1337/api/products?populate=*";

    struct Harness {
        fetcher: Fetcher,
        transport: MockTransport,
        storage: Arc<MemoryStorage>,
        clock: Arc<ManualClock>,
    }

    fn harness(transport: MockTransport) -> Harness {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let cache = CacheStore::with_storage(storage.clone()).with_clock(clock.clone());
        let fetcher = Fetcher::new(
            Arc::new(transport.clone()),
            cache,
            Url::parse(ORIGIN).unwrap(),
        );
        Harness {
            fetcher,
            transport,
            storage,
            clock,
        }
    }

    fn products_url() -> Url {
        Url::parse(PRODUCTS).unwrap()
    }

    #[tokio::test]
    async fn test_hit_skips_network() {
        let body = json!({"data": [{"id": 1, "name": "Lamp"}]});
        let h = harness(MockTransport::new().json(PRODUCTS, &body));
        let options = FetchOptions::cached("products");

        assert_eq!(h.fetcher.fetch(&products_url(), &options).await.unwrap(), body);
        assert_eq!(h.fetcher.fetch(&products_url(), &options).await.unwrap(), body);
        assert_eq!(h.transport.calls(), 1);

        h.clock.advance(Duration::from_secs(5 * 60));
        h.fetcher.fetch(&products_url(), &options).await.unwrap();
        assert_eq!(h.transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_without_key_never_caches() {
        let h = harness(MockTransport::new().json(PRODUCTS, &json!({"data": []})));

        h.fetcher
            .fetch(&products_url(), &FetchOptions::default())
            .await
            .unwrap();
        h.fetcher
            .fetch(&products_url(), &FetchOptions::cached("products").with_use_cache(false))
            .await
            .unwrap();

        assert_eq!(h.transport.calls(), 2);
        assert!(h.storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_http_error_caches_nothing() {
        let h = harness(MockTransport::new().route(PRODUCTS, 500, "oops"));

        let error = h
            .fetcher
            .fetch(&products_url(), &FetchOptions::cached("products"))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::HttpStatus);
        assert_eq!(error.status(), Some(500));
        assert_eq!(error.url.as_deref(), Some(PRODUCTS));
        assert!(h.storage.get_item("products").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_decode_and_network_errors() {
        let h = harness(
            MockTransport::new()
                .route(PRODUCTS, 200, "<html>")
                .unreachable("http://localhost:1337/api/services?populate=*"),
        );

        let error = h
            .fetcher
            .fetch(&products_url(), &FetchOptions::cached("products"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Decode);
        assert!(h.storage.is_empty().await);

        let error = h
            .fetcher
            .fetch_collection(Collection::Services)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Network);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_same_key_fetches_both_succeed() {
        let body = json!({"data": []});
        let h = harness(
            MockTransport::new()
                .json(PRODUCTS, &body)
                .with_latency(Duration::from_millis(50)),
        );
        let options = FetchOptions::cached("products");
        let url = products_url();

        let (a, b) = tokio::join!(
            h.fetcher.fetch(&url, &options),
            h.fetcher.fetch(&url, &options)
        );

        assert_eq!(a.unwrap(), body);
        assert_eq!(b.unwrap(), body);
        assert_eq!(h.transport.calls(), 2);
        assert_eq!(h.fetcher.cache().get("products").await, Some(body));
    }

    #[tokio::test]
    async fn test_disabled_config_bypasses_cache() {
        let h = harness(MockTransport::new().json(PRODUCTS, &json!({"data": []})));
        let fetcher = h
            .fetcher
            .clone()
            .with_config(CacheConfig::default().with_cache_enabled(false));

        fetcher.fetch_collection(Collection::Products).await.unwrap();
        fetcher.fetch_collection(Collection::Products).await.unwrap();

        assert_eq!(h.transport.calls(), 2);
        assert!(h.storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_fetch_member() {
        let url = "http://localhost:1337/api/team-members?populate[0]=avatar&populate[1]=gallery.image&filters[name][$eqi]=jane%20doe";
        let body = json!({"data": [{"id": 7, "attributes": {"name": "Jane Doe"}}]});
        let h = harness(MockTransport::new().json(url, &body));

        let member = h.fetcher.fetch_member("jane-doe").await.unwrap().unwrap();

        assert_eq!(member.str("name"), Some("Jane Doe"));
        assert!(h.storage.get_item("member_jane%20doe").await.unwrap().is_some());
        assert_eq!(
            h.fetcher.cache().tracked_keys().await,
            vec!["member_jane%20doe".to_string()]
        );
    }
}
