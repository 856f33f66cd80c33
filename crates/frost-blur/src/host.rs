#![forbid(unsafe_code)]

//! Host view hierarchy seams.
//!
//! The host owns the view tree and the notification registries. The
//! controller only sees the two views it works with through [`TargetView`]
//! and [`RootView`], and registers listeners that hold a weak handle back to
//! it. A listener that outlives its controller does nothing when fired.

use frost_core::geometry::{Point, Size};
use frost_render::{PackedRgba, Surface};

use crate::error::{BlurError, RenderError};
use crate::handle::WeakBlurHandle;

/// Registration token returned by the host for a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// The view that shows the blurred content behind itself.
///
/// Methods take `&self`; hosts use interior mutability for their registries.
pub trait TargetView {
    /// Size from the most recent measure pass (zero before layout).
    fn measured_size(&self) -> Size;

    /// Absolute on-screen position of the view's top-left corner.
    fn location_on_screen(&self) -> Point;

    /// Hint that the view has nothing to draw.
    fn set_will_not_draw(&self, will_not_draw: bool);

    /// Request a repaint.
    fn invalidate(&self);

    /// Subscribe to pre-draw notifications.
    fn add_pre_draw_listener(&self, listener: PreDrawListener) -> ListenerId;

    /// Unsubscribe a pre-draw listener. Unknown ids are ignored.
    fn remove_pre_draw_listener(&self, id: ListenerId);

    /// Subscribe to layout-change notifications.
    fn add_layout_listener(&self, listener: LayoutListener) -> ListenerId;

    /// Unsubscribe a layout listener. Unknown ids are ignored.
    fn remove_layout_listener(&self, id: ListenerId);
}

/// The view whose subtree is snapshotted.
pub trait RootView {
    /// Absolute on-screen position of the root's top-left corner.
    fn location_on_screen(&self) -> Point;

    /// Draw the whole subtree into `surface` using its current matrix.
    fn draw(&self, surface: &mut Surface) -> Result<(), RenderError>;
}

/// Base layer painted into the offscreen buffer before each snapshot.
pub trait ClearDrawable {
    /// Paint into `surface`.
    fn draw(&self, surface: &mut Surface);
}

impl ClearDrawable for PackedRgba {
    fn draw(&self, surface: &mut Surface) {
        surface.clear(*self);
    }
}

/// Pre-draw subscription: refreshes the blurred buffer before each frame.
#[derive(Debug, Clone)]
pub struct PreDrawListener {
    controller: WeakBlurHandle,
}

impl PreDrawListener {
    pub(crate) fn new(controller: WeakBlurHandle) -> Self {
        Self { controller }
    }

    /// Run one blur update. No-op once the controller has been dropped.
    pub fn on_pre_draw(&self) -> Result<(), BlurError> {
        match self.controller.upgrade() {
            Some(handle) => handle.update_blur().map(|_| ()),
            None => {
                tracing::trace!(target: "frost.blur", "pre-draw on dropped controller");
                Ok(())
            }
        }
    }

    /// Whether the controller is still alive.
    pub fn is_live(&self) -> bool {
        self.controller.is_live()
    }
}

/// One-shot layout subscription used while initialization is deferred.
#[derive(Debug, Clone)]
pub struct LayoutListener {
    controller: WeakBlurHandle,
}

impl LayoutListener {
    pub(crate) fn new(controller: WeakBlurHandle) -> Self {
        Self { controller }
    }

    /// Unsubscribe and initialize from the current measured size.
    /// No-op once the controller has been dropped.
    pub fn on_global_layout(&self) {
        match self.controller.upgrade() {
            Some(handle) => handle.on_layout(),
            None => tracing::trace!(target: "frost.blur", "layout on dropped controller"),
        }
    }

    /// Whether the controller is still alive.
    pub fn is_live(&self) -> bool {
        self.controller.is_live()
    }
}
