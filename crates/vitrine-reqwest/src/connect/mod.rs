//! Reqwest client module.
//!
//! Wraps the `reqwest` crate behind the [`ContentTransport`] seam.
//!
//! [`ContentTransport`]: vitrine_core::ContentTransport

mod client;
mod config;

pub use client::{ReqwestClient, TRACING_TARGET};
pub use config::ReqwestConfig;
