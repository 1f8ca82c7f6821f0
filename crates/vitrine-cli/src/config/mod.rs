//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── api_url: Url              # Content API origin
//! ├── cache: CacheConfig        # Session cache switch and TTL
//! ├── http: ReqwestConfig       # User agent
//! ├── render: RenderConfig      # Viewport, motion breakpoint, animation
//! └── command: Command          # render | member
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

use std::process;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use url::Url;
use vitrine_cache::CacheConfig;
use vitrine_core::Collection;
use vitrine_render::RenderConfig;
use vitrine_reqwest::ReqwestConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "vitrine")]
#[command(about = "Render content API collections into HTML")]
#[command(version)]
pub struct Cli {
    /// Origin of the content API
    #[arg(
        long = "api-url",
        env = "VITRINE_API_URL",
        default_value = "http://localhost:1337",
        global = true
    )]
    pub api_url: Url,

    /// Session cache configuration.
    #[clap(flatten)]
    pub cache: CacheConfig,

    /// HTTP transport configuration.
    #[clap(flatten)]
    pub http: ReqwestConfig,

    /// Rendering configuration.
    #[clap(flatten)]
    pub render: RenderConfig,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render one or more collections, each into its own container.
    Render(RenderArgs),
    /// Render the detail page of a single team member.
    Member(MemberArgs),
}

/// Arguments of `vitrine render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Collections to render, e.g. `products` or `team-members`
    #[arg(required = true)]
    pub collections: Vec<Collection>,

    /// Rich-text field rendered for every entry
    #[arg(long, default_value = "description")]
    pub field: String,

    /// Media field rendered as the entry image
    #[arg(long = "image-field")]
    pub image_field: Option<String>,

    /// Container id, when rendering a single collection (defaults to the collection path)
    #[arg(long)]
    pub selector: Option<String>,
}

impl RenderArgs {
    /// Container id for `collection`.
    pub fn container_id(&self, collection: Collection) -> String {
        match (&self.selector, self.collections.as_slice()) {
            (Some(selector), [_]) => selector.clone(),
            _ => collection.path().to_owned(),
        }
    }
}

/// Arguments of `vitrine member`.
#[derive(Debug, Clone, Args)]
pub struct MemberArgs {
    /// Page identifier of the member, e.g. `jane-doe`
    pub identifier: String,

    /// Rich-text field rendered as the biography
    #[arg(long, default_value = "description")]
    pub field: String,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// This ensures .env files are loaded before clap parses arguments, so
    /// variables from .env act as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.cannot_be_a_base() {
            anyhow::bail!("invalid API url: {}", self.api_url);
        }
        self.cache
            .validate()
            .context("invalid cache configuration")?;
        self.http
            .validate()
            .context("invalid HTTP configuration")?;
        self.render
            .validate()
            .context("invalid render configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            api_url = %self.api_url,
            "Content API configuration"
        );
        self.cache.log();
        self.http.log();
        self.render.log();
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
