//! Network seam used by the fetch layer.

use bytes::Bytes;
use url::Url;

use crate::Result;

/// Raw response of a single GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Undecoded response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Creates a response from a status code and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for `2xx` status codes.
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests against the content API.
///
/// Implementations perform exactly one request per call: no retry, no
/// timeout, no caching. Status codes are reported, not interpreted;
/// only a request that could not complete is an error (with
/// [`ErrorKind::Network`](crate::ErrorKind::Network)).
#[async_trait::async_trait]
pub trait ContentTransport: Send + Sync {
    /// Performs a GET request.
    async fn get(&self, url: &Url) -> Result<TransportResponse>;
}
