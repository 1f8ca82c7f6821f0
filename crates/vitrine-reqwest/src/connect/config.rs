//! Reqwest client configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use super::TRACING_TARGET;
use crate::{Error, Result};

/// Configuration for the reqwest transport.
///
/// No request timeout is applied; a request that never answers stays
/// pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "VITRINE_HTTP_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ReqwestConfig {
    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(Self::default_user_agent)
    }

    /// Returns the default user agent string.
    fn default_user_agent() -> String {
        format!("vitrine/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the user agent is set but blank.
    pub fn validate(&self) -> Result<()> {
        if self
            .user_agent
            .as_deref()
            .is_some_and(|agent| agent.trim().is_empty())
        {
            return Err(Error::Config("user agent must not be blank".into()));
        }
        Ok(())
    }

    /// Logs the transport configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET,
            user_agent = %self.effective_user_agent(),
            "HTTP transport configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_user_agent_uses_default_when_none() {
        let config = ReqwestConfig::default();
        assert!(config.effective_user_agent().starts_with("vitrine/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ReqwestConfig::default().with_user_agent("custom-agent/1.0");
        assert_eq!(config.effective_user_agent(), "custom-agent/1.0");
    }

    #[test]
    fn test_blank_user_agent_is_rejected() {
        let config = ReqwestConfig::default().with_user_agent("  ");
        assert!(config.validate().is_err());
    }
}
