//! Scripted transport for tests.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! vitrine-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use url::Url;

use crate::{ContentTransport, Error, Result, TRACING_TARGET_TRANSPORT, TransportResponse};

#[derive(Debug, Clone)]
enum Scripted {
    Respond(TransportResponse),
    Unreachable,
}

/// Transport answering from a fixed table of URLs.
///
/// Unknown URLs answer `404`. Every call is counted, so tests can assert
/// whether the network was touched.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<RwLock<HashMap<String, Scripted>>>,
    calls: Arc<AtomicUsize>,
    latency: Option<Duration>,
}

impl MockTransport {
    /// Creates a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every response by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answers `url` with the given status and body.
    #[must_use]
    pub fn route(self, url: &str, status: u16, body: impl Into<bytes::Bytes>) -> Self {
        self.insert(url, Scripted::Respond(TransportResponse::new(status, body)));
        self
    }

    /// Answers `url` with `200` and the serialized JSON.
    #[must_use]
    pub fn json(self, url: &str, value: &serde_json::Value) -> Self {
        let body = value.to_string();
        self.route(url, 200, body)
    }

    /// Makes requests to `url` fail as if the host was unreachable.
    #[must_use]
    pub fn unreachable(self, url: &str) -> Self {
        self.insert(url, Scripted::Unreachable);
        self
    }

    /// Number of requests issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn insert(&self, url: &str, scripted: Scripted) {
        if let Ok(mut routes) = self.routes.write() {
            routes.insert(url.to_owned(), scripted);
        }
    }
}

#[async_trait::async_trait]
impl ContentTransport for MockTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = self
            .routes
            .read()
            .ok()
            .and_then(|routes| routes.get(url.as_str()).cloned());

        tracing::trace!(
            target: TRACING_TARGET_TRANSPORT,
            url = %url,
            scripted = scripted.is_some(),
            "Mock transport request"
        );

        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Unreachable) => {
                Err(Error::network(url.as_str()).with_message("host unreachable"))
            }
            None => Ok(TransportResponse::new(404, "")),
        }
    }
}
