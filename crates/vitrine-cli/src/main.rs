#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod populate;
mod telemetry;

use std::process;
use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinSet;
use vitrine_cache::{CacheStore, Fetcher, MemoryStorage};
use vitrine_core::MediaResolver;
use vitrine_render::dom::Document;
use vitrine_render::{Injector, RichTextRenderer};
use vitrine_reqwest::ReqwestClient;

use crate::config::{Cli, Command, MemberArgs, RenderArgs};
use crate::populate::{Populator, settle_all, shared};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "vitrine_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "vitrine_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "vitrine_cli::config";
pub const TRACING_TARGET_POPULATE: &str = "vitrine_cli::populate";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "Application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "Application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    telemetry::init_tracing()?;

    cli.log();
    cli.validate()?;

    let populator = create_populator(&cli)?;

    let html = match &cli.command {
        Command::Render(args) => render_collections(populator, args).await?,
        Command::Member(args) => render_member(populator, args).await?,
    };

    println!("{html}");
    Ok(())
}

/// Wires transport, cache, renderer and injector from configuration.
fn create_populator(cli: &Cli) -> anyhow::Result<Populator> {
    let transport =
        ReqwestClient::new(cli.http.clone()).context("failed to create HTTP client")?;

    let cache = CacheStore::with_storage(Arc::new(MemoryStorage::new()))
        .with_default_ttl(cli.cache.ttl());
    let fetcher = Fetcher::new(Arc::new(transport), cache, cli.api_url.clone())
        .with_config(cli.cache.clone());

    let injector = Injector::new(RichTextRenderer::new(cli.render.clone()));
    let resolver = MediaResolver::new(cli.api_url.as_str());

    Ok(Populator::new(fetcher, injector, resolver))
}

/// Populates every requested collection concurrently, each into its own container.
async fn render_collections(populator: Populator, args: &RenderArgs) -> anyhow::Result<String> {
    let mut document = Document::new().with_title("vitrine");
    for &collection in &args.collections {
        document = document.with_container(args.container_id(collection));
    }
    let page = shared(document);

    let mut routines = JoinSet::new();
    for &collection in &args.collections {
        let populator = populator.clone();
        let page = page.clone();
        let container_id = args.container_id(collection);
        let field = args.field.clone();
        let image_field = args.image_field.clone();

        routines.spawn(async move {
            populator
                .collection(
                    &page,
                    collection,
                    &container_id,
                    &field,
                    image_field.as_deref(),
                )
                .await
        });
    }

    let mut handles = Vec::new();
    let mut failures = 0usize;
    while let Some(joined) = routines.join_next().await {
        match joined.context("population routine panicked")? {
            Ok(mut settled) => handles.append(&mut settled),
            Err(error) => {
                failures += 1;
                tracing::error!(
                    target: TRACING_TARGET_POPULATE,
                    error = %format!("{error:#}"),
                    "Failed to populate collection"
                );
            }
        }
    }

    if failures == args.collections.len() {
        anyhow::bail!("every collection failed to load");
    }

    let settled = settle_all(handles).await;
    tracing::debug!(target: TRACING_TARGET_POPULATE, settled, "Page settled");

    Ok(page.read().await.to_html())
}

/// Populates the detail page of a single team member.
async fn render_member(populator: Populator, args: &MemberArgs) -> anyhow::Result<String> {
    let page = shared(Document::new().with_container("member"));

    if let Some(handle) = populator
        .member(&page, &args.identifier, "member", &args.field)
        .await?
    {
        handle.settled().await;
    }

    let document = page.read().await;
    Ok(document.to_html())
}
