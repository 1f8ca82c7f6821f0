//! Rendering configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use vitrine_core::{Error, Result, SizeTier};

use crate::TRACING_TARGET_RENDER;

/// Default viewport width assumed when rendering outside a browser.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Viewport width at or below which motion attributes are omitted.
pub const DEFAULT_MOTION_BREAKPOINT: u32 = 768;

/// Animation used when a block carries no override.
pub const DEFAULT_ANIMATION: &str = "fade-up";

/// Animation duration in milliseconds used when a block carries no override.
pub const DEFAULT_ANIMATION_DURATION_MS: u32 = 700;

/// Configuration for the rich-text renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct RenderConfig {
    /// Viewport width in pixels
    #[cfg_attr(
        feature = "config",
        arg(long = "viewport-width", env = "VITRINE_VIEWPORT_WIDTH", default_value = "1280")
    )]
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    /// Viewport width at or below which blocks are rendered without motion
    #[cfg_attr(
        feature = "config",
        arg(
            long = "motion-breakpoint",
            env = "VITRINE_MOTION_BREAKPOINT",
            default_value = "768"
        )
    )]
    #[serde(default = "default_motion_breakpoint")]
    pub motion_breakpoint: u32,

    /// Animation applied to blocks without an override
    #[cfg_attr(
        feature = "config",
        arg(long = "animation", env = "VITRINE_ANIMATION", default_value = "fade-up")
    )]
    #[serde(default = "default_animation")]
    pub animation: String,

    /// Animation duration in milliseconds for blocks without an override
    #[cfg_attr(
        feature = "config",
        arg(
            long = "animation-duration",
            env = "VITRINE_ANIMATION_DURATION",
            default_value = "700"
        )
    )]
    #[serde(default = "default_animation_duration")]
    pub animation_duration_ms: u32,
}

fn default_viewport_width() -> u32 {
    DEFAULT_VIEWPORT_WIDTH
}

fn default_motion_breakpoint() -> u32 {
    DEFAULT_MOTION_BREAKPOINT
}

fn default_animation() -> String {
    DEFAULT_ANIMATION.to_owned()
}

fn default_animation_duration() -> u32 {
    DEFAULT_ANIMATION_DURATION_MS
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            motion_breakpoint: default_motion_breakpoint(),
            animation: default_animation(),
            animation_duration_ms: default_animation_duration(),
        }
    }
}

impl RenderConfig {
    /// Set the viewport width.
    #[must_use]
    pub fn with_viewport_width(mut self, width: u32) -> Self {
        self.viewport_width = width;
        self
    }

    /// Set the motion breakpoint.
    #[must_use]
    pub fn with_motion_breakpoint(mut self, breakpoint: u32) -> Self {
        self.motion_breakpoint = breakpoint;
        self
    }

    /// Returns `true` if top-level blocks get motion attributes.
    pub fn motion_enabled(&self) -> bool {
        self.viewport_width > self.motion_breakpoint
    }

    /// Image size tier matching the viewport.
    pub fn size_tier(&self) -> SizeTier {
        SizeTier::for_viewport(self.viewport_width)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the viewport width is zero or the
    /// default animation name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.viewport_width == 0 {
            return Err(Error::configuration().with_message("Viewport width must be positive"));
        }
        if self.animation.trim().is_empty() {
            return Err(Error::configuration().with_message("Animation name must not be blank"));
        }
        Ok(())
    }

    /// Logs the render configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_RENDER,
            viewport_width = self.viewport_width,
            motion_breakpoint = self.motion_breakpoint,
            motion = self.motion_enabled(),
            size_tier = %self.size_tier(),
            "Render configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert!(config.motion_enabled());
        assert_eq!(config.size_tier(), SizeTier::Large);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_motion_breakpoint_is_exclusive() {
        let config = RenderConfig::default().with_viewport_width(768);
        assert!(!config.motion_enabled());
        assert!(config.with_viewport_width(769).motion_enabled());
    }

    #[test]
    fn test_invalid_config() {
        assert!(RenderConfig::default().with_viewport_width(0).validate().is_err());
    }
}
