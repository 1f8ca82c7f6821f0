#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for content model parsing.
pub const TRACING_TARGET_CONTENT: &str = "vitrine_core::content";

/// Tracing target for media resolution.
pub const TRACING_TARGET_MEDIA: &str = "vitrine_core::media";

/// Tracing target for transport implementations.
pub const TRACING_TARGET_TRANSPORT: &str = "vitrine_core::transport";

mod collection;
mod entity;
mod error;
mod transport;

pub mod content;
pub mod media;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use collection::{Collection, MemberLookup};
pub use content::{BlockKind, ContentBlock, HeadingLevel, InlineNode, MotionHint, TextMarks};
pub use entity::Entity;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use media::{MediaReference, MediaResolver, SizeTier};
pub use transport::{ContentTransport, TransportResponse};
