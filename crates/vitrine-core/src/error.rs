//! Structured error handling for content fetching.

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while fetching and decoding content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The request could not complete.
    Network,
    /// The server answered with a non-success status.
    HttpStatus,
    /// The body was not JSON or had an unexpected shape.
    Decode,
    /// Session storage could not be read or written.
    Cache,
    /// Invalid configuration.
    Configuration,
}

/// Structured error type with classification and request context.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<String>,
    /// URL of the request that failed, if any.
    pub url: Option<String>,
    /// HTTP status code for [`ErrorKind::HttpStatus`] errors.
    pub status: Option<u16>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            url: None,
            status: None,
            source: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self::new(kind).with_source(source)
    }

    /// Creates a network error for the given URL.
    pub fn network(url: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network).with_url(url)
    }

    /// Creates an HTTP status error carrying the URL and status code.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        let url = url.into();
        let message = format!("fetch {url} failed: {status}");
        Self {
            status: Some(status),
            ..Self::new(ErrorKind::HttpStatus).with_url(url).with_message(message)
        }
    }

    /// Creates a decode error.
    pub fn decode() -> Self {
        Self::new(ErrorKind::Decode)
    }

    /// Creates a configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the URL of the failed request.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the HTTP status code, if this is a status error.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::from_source(ErrorKind::Decode, error).with_message("Invalid JSON body")
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Self::from_source(ErrorKind::Configuration, error).with_message("Invalid URL")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_error_new() {
        let error = Error::new(ErrorKind::Network);
        assert_eq!(error.kind, ErrorKind::Network);
        assert!(error.message.is_none());
        assert!(error.url.is_none());
        assert!(error.status.is_none());
        assert!(error.source.is_none());
    }

    #[test]
    fn test_http_status_carries_url_and_code() {
        let error = Error::http_status("http://cms.local/api/products", 500);

        assert_eq!(error.kind(), ErrorKind::HttpStatus);
        assert_eq!(error.status(), Some(500));
        assert_eq!(error.url.as_deref(), Some("http://cms.local/api/products"));

        let display = error.to_string();
        assert!(display.contains("http_status"));
        assert!(display.contains("500"));
    }

    #[test]
    fn test_from_json_error_is_decode() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error = Error::from(source);

        assert_eq!(error.kind, ErrorKind::Decode);
        assert!(error.source.is_some());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            ErrorKind::from_str("http_status").unwrap(),
            ErrorKind::HttpStatus
        );
        assert_eq!(ErrorKind::from_str("cache").unwrap(), ErrorKind::Cache);
        assert!(ErrorKind::from_str("timeout").is_err());
    }
}
