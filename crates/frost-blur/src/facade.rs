#![forbid(unsafe_code)]

//! Public control surface of a blur-behind effect.

use frost_render::PackedRgba;

use crate::host::ClearDrawable;

/// Chainable effect controls.
///
/// Implemented by [`crate::controller::SnapshotBlurController`] and by the
/// shared [`crate::handle::BlurHandle`].
///
/// Through a `BlurHandle`, a call made while the controller is mid-update
/// (from inside the hierarchy draw, or from a provider) is dropped with a
/// `warn!` event and has no effect. This includes `destroy`.
pub trait BlurViewFacade {
    /// Enable or disable the effect. Also toggles auto-update and requests a
    /// repaint.
    fn set_blur_enabled(&mut self, enabled: bool) -> &mut Self;

    /// Set the blur radius used from the next update on. Negative or
    /// non-finite values clamp to 0.
    fn set_blur_radius(&mut self, radius: f32) -> &mut Self;

    /// Subscribe to (or unsubscribe from) pre-draw notifications that refresh
    /// the blurred buffer.
    fn set_blur_auto_update(&mut self, enabled: bool) -> &mut Self;

    /// Compute the snapshot transform once per initialization.
    ///
    /// The caller asserts the target never moves relative to the root.
    fn set_fixed_transform(&mut self, fixed: bool) -> &mut Self;

    /// Set the tint drawn over the composite. Requests a repaint only when
    /// the colour changes.
    fn set_overlay_color(&mut self, color: PackedRgba) -> &mut Self;

    /// Paint `drawable` instead of clearing to transparent before each
    /// snapshot.
    fn set_frame_clear_drawable(&mut self, drawable: Option<Box<dyn ClearDrawable>>) -> &mut Self;

    /// Re-read the target's measured size and resize the buffer.
    fn update_blur_view_size(&mut self) -> &mut Self;

    /// Stop auto-update, release the provider and drop the buffer.
    /// Idempotent. Ignored through a busy [`crate::handle::BlurHandle`].
    fn destroy(&mut self);
}
