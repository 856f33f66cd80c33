#![forbid(unsafe_code)]

//! Tuning for one blur-behind effect instance.
//!
//! Each controller owns its own [`BlurConfig`]; there are no process-wide
//! tuning globals, so effects with different settings coexist.

use frost_render::PackedRgba;

use crate::error::BlurError;

/// Default snapshot downscale factor.
pub const DEFAULT_DOWNSCALE_FACTOR: f32 = 8.0;
/// Default row-length granularity for offscreen buffers.
pub const DEFAULT_ALIGNMENT_STRIDE: u32 = 64;
/// Default blur radius, in offscreen pixels.
pub const DEFAULT_BLUR_RADIUS: f32 = 16.0;

/// Configuration for a [`crate::controller::SnapshotBlurController`].
///
/// `fixed_transform` asserts that the target view never moves relative to
/// its root after initialization. The controller cannot check this; a view
/// that does move will show stale content until the next re-initialization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlurConfig {
    /// Snapshot resolution divisor (must be finite and > 0).
    pub downscale_factor: f32,
    /// Buffer dimensions are rounded up to a multiple of this (must be > 0).
    pub alignment_stride: u32,
    /// Blur radius handed to the provider (finite, >= 0).
    pub blur_radius: f32,
    /// Tint flood-filled over the composite; transparent disables it.
    pub overlay_color: PackedRgba,
    /// Compute the snapshot transform once per initialization.
    pub fixed_transform: bool,
    /// Subscribe to pre-draw notifications at construction.
    pub auto_update: bool,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            downscale_factor: DEFAULT_DOWNSCALE_FACTOR,
            alignment_stride: DEFAULT_ALIGNMENT_STRIDE,
            blur_radius: DEFAULT_BLUR_RADIUS,
            overlay_color: PackedRgba::TRANSPARENT,
            fixed_transform: false,
            auto_update: true,
        }
    }
}

impl BlurConfig {
    /// Set the downscale factor.
    #[must_use]
    pub fn with_downscale_factor(mut self, factor: f32) -> Self {
        self.downscale_factor = factor;
        self
    }

    /// Set the alignment stride.
    #[must_use]
    pub fn with_alignment_stride(mut self, stride: u32) -> Self {
        self.alignment_stride = stride;
        self
    }

    /// Set the blur radius.
    #[must_use]
    pub fn with_blur_radius(mut self, radius: f32) -> Self {
        self.blur_radius = radius;
        self
    }

    /// Set the overlay tint.
    #[must_use]
    pub fn with_overlay_color(mut self, color: PackedRgba) -> Self {
        self.overlay_color = color;
        self
    }

    /// Enable or disable fixed-transform mode.
    #[must_use]
    pub fn with_fixed_transform(mut self, fixed: bool) -> Self {
        self.fixed_transform = fixed;
        self
    }

    /// Enable or disable pre-draw auto-update at construction.
    #[must_use]
    pub fn with_auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = auto_update;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), BlurError> {
        if !self.downscale_factor.is_finite() || self.downscale_factor <= 0.0 {
            return Err(BlurError::invalid(
                "downscale_factor",
                format!("must be finite and > 0, got {}", self.downscale_factor),
            ));
        }
        if self.alignment_stride == 0 {
            return Err(BlurError::invalid("alignment_stride", "must be > 0"));
        }
        if !self.blur_radius.is_finite() || self.blur_radius < 0.0 {
            return Err(BlurError::invalid(
                "blur_radius",
                format!("must be finite and >= 0, got {}", self.blur_radius),
            ));
        }
        Ok(())
    }
}
