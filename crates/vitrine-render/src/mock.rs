//! Test doubles for the injector.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! vitrine-render = { version = "...", features = ["test-utils"] }
//! ```

use std::sync::Mutex;

use crate::{MotionRefresher, RefreshResult};

/// How a [`RecordingRefresher`] answers its calls.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    #[default]
    Succeed,
    Fail,
    Panic,
    Stall,
}

/// Refresher recording every call, then answering as configured.
#[derive(Debug, Default)]
pub struct RecordingRefresher {
    calls: Mutex<Vec<&'static str>>,
    behavior: Behavior,
}

impl RecordingRefresher {
    /// Creates a refresher whose calls succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a refresher whose calls fail.
    pub fn failing() -> Self {
        Self::with_behavior(Behavior::Fail)
    }

    /// Creates a refresher whose calls panic.
    pub fn panicking() -> Self {
        Self::with_behavior(Behavior::Panic)
    }

    /// Creates a refresher whose calls never complete.
    pub fn stalled() -> Self {
        Self::with_behavior(Behavior::Stall)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            calls: Mutex::default(),
            behavior,
        }
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    async fn record(&self, call: &'static str) -> RefreshResult {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(format!("{call} rejected").into()),
            Behavior::Panic => panic!("{call} crashed"),
            Behavior::Stall => std::future::pending().await,
        }
    }
}

#[async_trait::async_trait]
impl MotionRefresher for RecordingRefresher {
    async fn refresh(&self) -> RefreshResult {
        self.record("refresh").await
    }

    async fn refresh_hard(&self) -> RefreshResult {
        self.record("refresh_hard").await
    }
}
