//! Internal error types for vitrine-reqwest.

use thiserror::Error;

/// Result type alias for vitrine-reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Internal error type for vitrine-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed or the client could not be built.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<Error> for vitrine_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                let error = match e.url() {
                    Some(url) => vitrine_core::Error::network(url.as_str()),
                    None => vitrine_core::Error::new(vitrine_core::ErrorKind::Network),
                };
                if e.is_connect() {
                    error.with_message("Connection failed").with_source(e)
                } else {
                    error.with_message(e.to_string()).with_source(e)
                }
            }
            Error::Config(message) => vitrine_core::Error::configuration().with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_maps_to_configuration() {
        let error: vitrine_core::Error = Error::Config("empty user agent".into()).into();
        assert_eq!(error.kind(), vitrine_core::ErrorKind::Configuration);
        assert_eq!(error.message.as_deref(), Some("empty user agent"));
    }
}
