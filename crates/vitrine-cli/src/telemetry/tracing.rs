//! Diagnostics for the `vitrine` binary.
//!
//! stdout is reserved for the rendered page so it can be piped into a file;
//! every fetch, cache and injection event is written to stderr.

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Installs the stderr subscriber.
///
/// `RUST_LOG` selects the verbosity per target (`info` when unset), e.g.
/// `vitrine_cache=debug` shows every hit, miss and expiry while the page
/// still lands cleanly on stdout:
///
/// ```bash
/// RUST_LOG=vitrine_cache=debug,vitrine_render=debug vitrine render products > products.html
/// ```
pub(super) fn init_tracing() -> anyhow::Result<()> {
    let env_filter = create_env_filter()?;
    let fmt_layer = create_fmt_layer();

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    Ok(())
}

/// Per-target filter from `RUST_LOG`, falling back to `info`.
fn create_env_filter() -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {e}"))
}

/// Human-readable layer on stderr; colors only when stderr is a terminal.
fn create_fmt_layer() -> impl Layer<Registry> + Send + Sync {
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
}
