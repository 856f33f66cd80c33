#![forbid(unsafe_code)]

//! Shared single-threaded handle to a controller.
//!
//! [`BlurHandle`] is the strong owner callers keep; listeners registered with
//! the host hold a [`WeakBlurHandle`], so the host never keeps a controller
//! alive and a late notification on a dropped controller does nothing.
//!
//! The controller is borrowed for the duration of an update, during which
//! the hierarchy is drawn. A draw reaching this handle from inside that
//! hierarchy draw finds the controller busy and is refused as
//! [`DrawOutcome::Recursion`].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use frost_render::{PackedRgba, Surface};

use crate::config::BlurConfig;
use crate::controller::{DrawOutcome, SnapshotBlurController, UpdateOutcome};
use crate::error::BlurError;
use crate::facade::BlurViewFacade;
use crate::host::{ClearDrawable, RootView, TargetView};
use crate::provider::BlurProvider;

/// Strong, cloneable handle to a [`SnapshotBlurController`].
#[derive(Clone)]
pub struct BlurHandle {
    inner: Rc<RefCell<SnapshotBlurController>>,
}

impl fmt::Debug for BlurHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(controller) => f.debug_tuple("BlurHandle").field(&*controller).finish(),
            Err(_) => f.write_str("BlurHandle(<busy>)"),
        }
    }
}

impl BlurHandle {
    /// Build a controller for `target`, snapshotting `root`.
    ///
    /// Subscribes auto-update when configured, then initializes from the
    /// target's measured size or defers until its first layout.
    pub fn new(
        target: Rc<dyn TargetView>,
        root: Rc<dyn RootView>,
        provider: Box<dyn BlurProvider>,
        config: BlurConfig,
    ) -> Result<Self, BlurError> {
        config.validate()?;
        let inner = Rc::new_cyclic(|weak| {
            let self_handle = WeakBlurHandle {
                inner: weak.clone(),
            };
            RefCell::new(SnapshotBlurController::new(
                self_handle,
                target,
                root,
                provider,
                config,
            ))
        });
        inner.borrow_mut().attach();
        Ok(Self { inner })
    }

    /// Weak handle for listeners.
    pub fn downgrade(&self) -> WeakBlurHandle {
        WeakBlurHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Run `f` against the controller, or `None` while it is mid-update.
    pub fn with<R>(&self, f: impl FnOnce(&SnapshotBlurController) -> R) -> Option<R> {
        self.inner.try_borrow().ok().map(|c| f(&c))
    }

    /// Run `f` against the controller mutably, or `None` while it is busy.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut SnapshotBlurController) -> R) -> Option<R> {
        self.inner.try_borrow_mut().ok().map(|mut c| f(&mut c))
    }

    /// See [`SnapshotBlurController::update_blur`]. Skipped while busy.
    pub fn update_blur(&self) -> Result<UpdateOutcome, BlurError> {
        match self.inner.try_borrow_mut() {
            Ok(mut controller) => controller.update_blur(),
            Err(_) => {
                tracing::trace!(target: "frost.blur", "re-entrant update skipped");
                Ok(UpdateOutcome::Skipped)
            }
        }
    }

    /// See [`SnapshotBlurController::draw`]. Refused as recursion while busy.
    pub fn draw(&self, canvas: &mut Surface) -> Result<DrawOutcome, BlurError> {
        match self.inner.try_borrow_mut() {
            Ok(mut controller) => controller.draw(canvas),
            Err(_) => {
                tracing::trace!(target: "frost.blur", "draw during update refused");
                Ok(DrawOutcome::Recursion)
            }
        }
    }

    pub(crate) fn on_layout(&self) {
        if self.with_mut(SnapshotBlurController::on_layout).is_none() {
            tracing::trace!(target: "frost.blur", "layout during update ignored");
        }
    }

    fn apply(&mut self, op: &'static str, f: impl FnOnce(&mut SnapshotBlurController)) -> &mut Self {
        if self.with_mut(f).is_none() {
            tracing::warn!(target: "frost.blur", op, "controller busy; call ignored");
        }
        self
    }
}

/// Every call borrows the controller. While it is mid-update the call is
/// ignored and a `warn!` is emitted, so `destroy` issued from inside the
/// hierarchy draw leaves the effect running.
impl BlurViewFacade for BlurHandle {
    fn set_blur_enabled(&mut self, enabled: bool) -> &mut Self {
        self.apply("set_blur_enabled", |c| {
            c.set_blur_enabled(enabled);
        })
    }

    fn set_blur_radius(&mut self, radius: f32) -> &mut Self {
        self.apply("set_blur_radius", |c| {
            c.set_blur_radius(radius);
        })
    }

    fn set_blur_auto_update(&mut self, enabled: bool) -> &mut Self {
        self.apply("set_blur_auto_update", |c| {
            c.set_blur_auto_update(enabled);
        })
    }

    fn set_fixed_transform(&mut self, fixed: bool) -> &mut Self {
        self.apply("set_fixed_transform", |c| {
            c.set_fixed_transform(fixed);
        })
    }

    fn set_overlay_color(&mut self, color: PackedRgba) -> &mut Self {
        self.apply("set_overlay_color", |c| {
            c.set_overlay_color(color);
        })
    }

    fn set_frame_clear_drawable(&mut self, drawable: Option<Box<dyn ClearDrawable>>) -> &mut Self {
        self.apply("set_frame_clear_drawable", |c| {
            c.set_frame_clear_drawable(drawable);
        })
    }

    fn update_blur_view_size(&mut self) -> &mut Self {
        self.apply("update_blur_view_size", |c| {
            c.update_blur_view_size();
        })
    }

    fn destroy(&mut self) {
        self.apply("destroy", |c| c.destroy());
    }
}

/// Non-owning handle held by host listeners.
#[derive(Clone, Default)]
pub struct WeakBlurHandle {
    inner: Weak<RefCell<SnapshotBlurController>>,
}

impl fmt::Debug for WeakBlurHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakBlurHandle")
            .field("live", &self.is_live())
            .finish()
    }
}

impl WeakBlurHandle {
    /// Upgrade to a strong handle if the controller is still alive.
    pub fn upgrade(&self) -> Option<BlurHandle> {
        self.inner.upgrade().map(|inner| BlurHandle { inner })
    }

    /// Whether the controller is still alive.
    pub fn is_live(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
