//! Reqwest-based transport for the content API.

use std::sync::Arc;

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use url::Url;
use vitrine_core::{ContentTransport, TransportResponse};

use super::ReqwestConfig;
use crate::Result;

/// Tracing target for reqwest client operations.
pub const TRACING_TARGET: &str = "vitrine_reqwest::client";

/// Inner client that holds the HTTP client and configuration.
struct ReqwestClientInner {
    http: Client,
    config: ReqwestConfig,
}

/// Reqwest-based HTTP client for reading the content API.
///
/// Cloning is cheap; clones share the connection pool.
///
/// # Examples
///
/// ```rust,ignore
/// use vitrine_core::ContentTransport;
/// use vitrine_reqwest::{ReqwestClient, ReqwestConfig};
///
/// let client = ReqwestClient::new(ReqwestConfig::default())?;
/// let url = url::Url::parse("http://localhost:1337/api/products?populate=*")?;
/// let response = client.get(&url).await?;
/// ```
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Arc<ReqwestClientInner>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Creates a new reqwest client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ReqwestConfig) -> Result<Self> {
        config.validate()?;
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            user_agent = %user_agent,
            "Creating reqwest client"
        );

        let http = Client::builder().user_agent(&user_agent).build()?;

        let inner = ReqwestClientInner { http, config };
        let client = Self {
            inner: Arc::new(inner),
        };

        tracing::info!(
            target: TRACING_TARGET,
            "Reqwest client created successfully"
        );

        Ok(client)
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ReqwestConfig::default())
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    async fn send(&self, url: &Url) -> Result<TransportResponse> {
        let response = self
            .inner
            .http
            .get(url.as_str())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(TransportResponse::new(status, body))
    }
}

#[async_trait::async_trait]
impl ContentTransport for ReqwestClient {
    async fn get(&self, url: &Url) -> vitrine_core::Result<TransportResponse> {
        tracing::debug!(target: TRACING_TARGET, url = %url, "Sending request");

        match self.send(url).await {
            Ok(response) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    url = %url,
                    status = response.status,
                    bytes = response.body.len(),
                    "Received response"
                );
                Ok(response)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    url = %url,
                    error = %error,
                    "Request failed"
                );
                Err(vitrine_core::Error::from(error).with_url(url.as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use vitrine_core::ErrorKind;

    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ReqwestClient::with_defaults().unwrap();
        assert!(client.config().user_agent.is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ReqwestConfig::default().with_user_agent("");
        assert!(ReqwestClient::new(config).is_err());
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let client = ReqwestClient::with_defaults().unwrap();
        let url = Url::parse("http://127.0.0.1:1/api/products?populate=*").unwrap();

        let error = client.get(&url).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Network);
        assert_eq!(error.url.as_deref(), Some(url.as_str()));
    }
}
