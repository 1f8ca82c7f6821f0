#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for rich-text rendering.
pub const TRACING_TARGET_RENDER: &str = "vitrine_render::renderer";

/// Tracing target for page injection and the settle fallback.
pub const TRACING_TARGET_INJECT: &str = "vitrine_render::injector";

mod config;
mod html;
mod injector;
mod renderer;

pub mod dom;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use config::RenderConfig;
pub use injector::{
    InjectError, Injector, MotionRefresher, Page, RefreshResult, SettleHandle,
};
pub use renderer::RichTextRenderer;
