#![forbid(unsafe_code)]

//! Snapshot-and-blur controller.
//!
//! Owns one offscreen buffer per effect instance. Each update redraws the
//! hierarchy under the target view into the buffer through a downscaling
//! transform, hands the buffer to the [`BlurProvider`], and each draw
//! composites the result back at view scale with an optional tint.
//!
//! # Lifecycle
//!
//! ```text
//! construct ──► measured size non-zero? ──yes──► initialize ──► update/draw …
//!                     │ no                             ▲
//!                     ▼                                │
//!              defer: one-shot layout listener ────────┘
//!
//! destroy ──► auto-update off, provider released, buffer dropped (terminal)
//! ```
//!
//! # Invariants
//!
//! 1. The offscreen buffer is never zero-sized; its dimensions are stride-aligned
//! 2. The offscreen surface is never a composite target: it is owned by the
//!    controller, and re-entrant draws through the handle are refused
//! 3. Hierarchy render failures never propagate; provider failures always do
//! 4. A provider's output must match its `can_modify_in_place` capability;
//!    a mismatch is a provider failure and the buffer is not adopted
//! 5. `destroy` is idempotent

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use frost_core::geometry::Size;
use frost_render::{FilterMode, PackedRgba, Pixmap, Surface, SurfaceId, Transform};

use crate::config::BlurConfig;
use crate::error::{BlurError, ProviderError};
use crate::facade::BlurViewFacade;
use crate::handle::WeakBlurHandle;
use crate::host::{ClearDrawable, LayoutListener, ListenerId, PreDrawListener, RootView, TargetView};
use crate::provider::{BlurOutput, BlurProvider};
use crate::sizing::BufferGeometry;
use crate::transform::{TransformState, offscreen_transform};

const LOG_TARGET: &str = "frost.blur";

bitflags! {
    /// Effect state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EffectState: u8 {
        /// Updates and composites run.
        const ENABLED     = 0b0000_0001;
        /// An offscreen buffer is allocated.
        const INITIALIZED = 0b0000_0010;
        /// A pre-draw listener is registered.
        const AUTO_UPDATE = 0b0000_0100;
        /// `destroy` has run.
        const DESTROYED   = 0b0000_1000;
    }
}

/// What an update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Disabled or not initialized; nothing touched.
    Skipped,
    /// Snapshot and blur completed.
    Updated,
    /// The hierarchy failed to render; the buffer was still blurred.
    Degraded,
}

/// What a draw did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// Disabled or not initialized; nothing composited.
    Skipped,
    /// The controller is mid-update: the draw came from inside the hierarchy
    /// draw, targeting the offscreen surface.
    Recursion,
    /// The blurred buffer was composited.
    Composited,
}

impl DrawOutcome {
    /// True only when the blurred content was drawn.
    #[inline]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Composited)
    }
}

/// Running counters for one controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlurStats {
    /// Blur steps completed.
    pub frames_blurred: u64,
    /// Composites onto a host surface.
    pub composites: u64,
    /// Hierarchy draws that returned an error.
    pub render_failures: u64,
    /// Message of the most recent hierarchy draw failure.
    pub last_render_error: Option<String>,
}

/// Blur-behind controller for one target view.
///
/// Created through [`crate::handle::BlurHandle::new`], which wires up the weak
/// back-reference its listeners need.
pub struct SnapshotBlurController {
    config: BlurConfig,
    state: EffectState,
    target: Rc<dyn TargetView>,
    root: Rc<dyn RootView>,
    provider: Box<dyn BlurProvider>,
    geometry: Option<BufferGeometry>,
    surface: Option<Surface>,
    transform: TransformState,
    clear_drawable: Option<Box<dyn ClearDrawable>>,
    self_handle: WeakBlurHandle,
    pre_draw_listener: Option<ListenerId>,
    layout_listener: Option<ListenerId>,
    stats: BlurStats,
}

impl fmt::Debug for SnapshotBlurController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotBlurController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("provider", &self.provider.name())
            .field("geometry", &self.geometry)
            .field("transform", &self.transform)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl SnapshotBlurController {
    pub(crate) fn new(
        self_handle: WeakBlurHandle,
        target: Rc<dyn TargetView>,
        root: Rc<dyn RootView>,
        provider: Box<dyn BlurProvider>,
        config: BlurConfig,
    ) -> Self {
        Self {
            transform: TransformState::new(config.fixed_transform),
            config,
            state: EffectState::ENABLED,
            target,
            root,
            provider,
            geometry: None,
            surface: None,
            clear_drawable: None,
            self_handle,
            pre_draw_listener: None,
            layout_listener: None,
            stats: BlurStats::default(),
        }
    }

    /// Subscribe auto-update and initialize, or defer until first layout.
    pub(crate) fn attach(&mut self) {
        if self.config.auto_update {
            self.set_blur_auto_update(true);
        }
        let measured = self.target.measured_size();
        if BufferGeometry::compute(measured, &self.config).is_none() {
            self.defer_initialization();
            return;
        }
        self.initialize(measured);
    }

    // ========== Accessors ==========

    /// Current configuration, including radius and overlay changes.
    pub fn config(&self) -> &BlurConfig {
        &self.config
    }

    /// Current state flags.
    pub fn state(&self) -> EffectState {
        self.state
    }

    /// Whether updates and composites run.
    pub fn is_enabled(&self) -> bool {
        self.state.contains(EffectState::ENABLED)
    }

    /// Whether an offscreen buffer is allocated.
    pub fn is_initialized(&self) -> bool {
        self.state.contains(EffectState::INITIALIZED)
    }

    /// Geometry of the current buffer.
    pub fn geometry(&self) -> Option<&BufferGeometry> {
        self.geometry.as_ref()
    }

    /// The offscreen buffer.
    pub fn buffer(&self) -> Option<&Pixmap> {
        self.surface.as_ref().map(Surface::pixmap)
    }

    /// Identity of the offscreen surface, stable across reallocations.
    pub fn offscreen_surface_id(&self) -> Option<SurfaceId> {
        self.surface.as_ref().map(Surface::id)
    }

    /// Fixed/dynamic transform state.
    pub fn transform_state(&self) -> &TransformState {
        &self.transform
    }

    /// Counters and the last render failure.
    pub fn stats(&self) -> &BlurStats {
        &self.stats
    }

    // ========== Buffer Lifecycle ==========

    /// Re-initialize for a new measured size.
    ///
    /// Returns `Ok(true)` when a buffer is ready and `Ok(false)` when the size
    /// is too small to allocate (the target is marked will-not-draw and any
    /// existing buffer is kept). A size that needs the same buffer dimensions
    /// and scale correction keeps the current buffer and its content.
    pub fn resize(&mut self, measured: Size) -> Result<bool, BlurError> {
        if self.state.contains(EffectState::DESTROYED) {
            return Err(BlurError::Released);
        }
        Ok(self.initialize(measured))
    }

    fn initialize(&mut self, measured: Size) -> bool {
        let Some(geometry) = BufferGeometry::compute(measured, &self.config) else {
            tracing::debug!(
                target: LOG_TARGET,
                width = measured.width,
                height = measured.height,
                "no buffer for target size; will not draw"
            );
            self.target.set_will_not_draw(true);
            return false;
        };

        self.target.set_will_not_draw(false);

        if self.is_initialized()
            && self
                .geometry
                .is_some_and(|current| current.same_allocation(&geometry))
        {
            tracing::trace!(target: LOG_TARGET, "buffer size unchanged; keeping buffer");
            self.geometry = Some(geometry);
            return true;
        }

        let format = self.provider.supported_pixel_format();
        let Some(pixmap) = Pixmap::with_size(geometry.aligned, format) else {
            return false;
        };
        tracing::debug!(
            target: LOG_TARGET,
            measured_w = measured.width,
            measured_h = measured.height,
            buffer_w = geometry.aligned.width,
            buffer_h = geometry.aligned.height,
            correction_x = geometry.correction.width,
            correction_y = geometry.correction.height,
            ?format,
            "offscreen buffer allocated"
        );

        match self.surface.as_mut() {
            Some(surface) => {
                surface.rebind(pixmap);
            }
            None => self.surface = Some(Surface::new(pixmap)),
        }
        self.geometry = Some(geometry);
        self.transform.invalidate();
        self.state.insert(EffectState::INITIALIZED);

        if self.transform.is_fixed() {
            self.current_transform(geometry);
        }
        true
    }

    fn defer_initialization(&mut self) {
        if self.layout_listener.is_some() {
            return;
        }
        tracing::debug!(target: LOG_TARGET, "target not laid out; deferring initialization");
        let listener = LayoutListener::new(self.self_handle.clone());
        self.layout_listener = Some(self.target.add_layout_listener(listener));
    }

    /// Handle the deferred layout notification: unsubscribe, then initialize.
    pub(crate) fn on_layout(&mut self) {
        if let Some(id) = self.layout_listener.take() {
            self.target.remove_layout_listener(id);
        }
        let measured = self.target.measured_size();
        if let Err(err) = self.resize(measured) {
            tracing::debug!(target: LOG_TARGET, error = %err, "layout after destroy ignored");
        }
    }

    fn current_transform(&mut self, geometry: BufferGeometry) -> Transform {
        let root = &self.root;
        let target = &self.target;
        self.transform.resolve(|| {
            offscreen_transform(
                root.location_on_screen(),
                target.location_on_screen(),
                geometry.effective_scale,
            )
        })
    }

    // ========== Per-frame Pipeline ==========

    /// Redraw the hierarchy into the offscreen buffer and blur it.
    ///
    /// Provider errors propagate; hierarchy render errors are logged, counted
    /// in [`BlurStats`], and the blur step still runs.
    pub fn update_blur(&mut self) -> Result<UpdateOutcome, BlurError> {
        if !self
            .state
            .contains(EffectState::ENABLED | EffectState::INITIALIZED)
        {
            return Ok(UpdateOutcome::Skipped);
        }
        let Some(geometry) = self.geometry else {
            return Ok(UpdateOutcome::Skipped);
        };
        let transform = self.current_transform(geometry);
        let Some(surface) = self.surface.as_mut() else {
            return Ok(UpdateOutcome::Skipped);
        };
        tracing::trace!(target: LOG_TARGET, "update");

        match &self.clear_drawable {
            Some(drawable) => drawable.draw(surface),
            None => surface.clear(PackedRgba::TRANSPARENT),
        }

        surface.save();
        surface.concat(transform);
        let rendered = self.root.draw(surface);
        surface.restore();

        let mut outcome = UpdateOutcome::Updated;
        if let Err(err) = rendered {
            tracing::warn!(
                target: LOG_TARGET,
                error = %err,
                failures = self.stats.render_failures + 1,
                "hierarchy render failed; blurring partial frame"
            );
            self.stats.render_failures += 1;
            self.stats.last_render_error = Some(err.message().to_owned());
            outcome = UpdateOutcome::Degraded;
        }

        let radius = self.config.blur_radius;
        let in_place = self.provider.can_modify_in_place();
        match (self.provider.blur(surface.pixmap_mut(), radius)?, in_place) {
            (BlurOutput::InPlace, true) => {}
            (BlurOutput::Replaced(pixmap), false) => {
                tracing::trace!(
                    target: LOG_TARGET,
                    provider = self.provider.name(),
                    "adopting replaced buffer"
                );
                surface.rebind(pixmap);
            }
            (output, _) => {
                let err = ProviderError::Backend(format!(
                    "provider `{}` reports in-place = {in_place} but returned {}",
                    self.provider.name(),
                    match output {
                        BlurOutput::InPlace => "the input buffer",
                        BlurOutput::Replaced(_) => "a replacement buffer",
                    }
                ));
                tracing::warn!(target: LOG_TARGET, error = %err, "blur output rejected");
                return Err(err.into());
            }
        }
        self.stats.frames_blurred += 1;
        Ok(outcome)
    }

    /// Refresh the blur and composite it onto `canvas`.
    ///
    /// The offscreen surface is owned here and borrowed for the whole update,
    /// so it can never be passed in as `canvas`. The only way to reach it is a
    /// re-entrant draw from inside the hierarchy draw, which
    /// [`crate::handle::BlurHandle::draw`] refuses as
    /// [`DrawOutcome::Recursion`].
    pub fn draw(&mut self, canvas: &mut Surface) -> Result<DrawOutcome, BlurError> {
        if !self
            .state
            .contains(EffectState::ENABLED | EffectState::INITIALIZED)
        {
            return Ok(DrawOutcome::Skipped);
        }

        self.update_blur()?;

        let (Some(geometry), Some(surface)) = (self.geometry, self.surface.as_ref()) else {
            return Ok(DrawOutcome::Skipped);
        };
        let (sx, sy) = geometry.effective_scale;
        canvas.save();
        canvas.scale(sx, sy);
        canvas.draw_pixmap(surface.pixmap(), 0.0, 0.0, FilterMode::Bilinear);
        canvas.restore();

        let overlay = self.config.overlay_color;
        if !overlay.is_transparent() {
            canvas.draw_color(overlay);
        }
        self.stats.composites += 1;
        tracing::trace!(target: LOG_TARGET, sx, sy, "composited");
        Ok(DrawOutcome::Composited)
    }
}

impl BlurViewFacade for SnapshotBlurController {
    fn set_blur_enabled(&mut self, enabled: bool) -> &mut Self {
        self.state.set(EffectState::ENABLED, enabled);
        self.set_blur_auto_update(enabled);
        self.target.invalidate();
        self
    }

    fn set_blur_radius(&mut self, radius: f32) -> &mut Self {
        self.config.blur_radius = if radius.is_finite() && radius > 0.0 {
            radius
        } else {
            0.0
        };
        self
    }

    fn set_blur_auto_update(&mut self, enabled: bool) -> &mut Self {
        if let Some(id) = self.pre_draw_listener.take() {
            self.target.remove_pre_draw_listener(id);
        }
        let subscribe = enabled && !self.state.contains(EffectState::DESTROYED);
        if subscribe {
            let listener = PreDrawListener::new(self.self_handle.clone());
            self.pre_draw_listener = Some(self.target.add_pre_draw_listener(listener));
        }
        self.state.set(EffectState::AUTO_UPDATE, subscribe);
        tracing::debug!(target: LOG_TARGET, enabled = subscribe, "auto-update");
        self
    }

    fn set_fixed_transform(&mut self, fixed: bool) -> &mut Self {
        self.config.fixed_transform = fixed;
        self.transform.set_fixed(fixed);
        self
    }

    fn set_overlay_color(&mut self, color: PackedRgba) -> &mut Self {
        if self.config.overlay_color != color {
            self.config.overlay_color = color;
            self.target.invalidate();
        }
        self
    }

    fn set_frame_clear_drawable(&mut self, drawable: Option<Box<dyn ClearDrawable>>) -> &mut Self {
        self.clear_drawable = drawable;
        self
    }

    fn update_blur_view_size(&mut self) -> &mut Self {
        let measured = self.target.measured_size();
        if let Err(err) = self.resize(measured) {
            tracing::debug!(target: LOG_TARGET, error = %err, "resize after destroy ignored");
        }
        self
    }

    fn destroy(&mut self) {
        if self.state.contains(EffectState::DESTROYED) {
            tracing::trace!(target: LOG_TARGET, "already destroyed");
            return;
        }
        self.set_blur_auto_update(false);
        if let Some(id) = self.layout_listener.take() {
            self.target.remove_layout_listener(id);
        }
        self.provider.release();
        self.state.remove(EffectState::INITIALIZED);
        self.state.insert(EffectState::DESTROYED);
        self.surface = None;
        self.geometry = None;
        self.transform.invalidate();
        tracing::debug!(target: LOG_TARGET, provider = self.provider.name(), "destroyed");
    }
}
