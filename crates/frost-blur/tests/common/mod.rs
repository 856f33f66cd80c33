//! Test doubles for the host view hierarchy and the blur backend.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use frost_blur::host::{LayoutListener, ListenerId, PreDrawListener, RootView, TargetView};
use frost_blur::{
    BlurConfig, BlurError, BlurHandle, BlurOutput, BlurProvider, BlurViewFacade, ProviderError,
    RenderError, WeakBlurHandle,
};
use frost_core::geometry::{Point, Rect, Size};
use frost_render::{PackedRgba, PixelFormat, Pixmap, Surface, SurfaceId, Transform};

// ============================================================================
// Target view
// ============================================================================

#[derive(Default)]
pub struct FakeTarget {
    pub size: Cell<Size>,
    pub location: Cell<Point>,
    pub will_not_draw: Cell<Option<bool>>,
    pub invalidations: Cell<u32>,
    next_id: Cell<u64>,
    pre_draw: RefCell<Vec<(ListenerId, PreDrawListener)>>,
    layout: RefCell<Vec<(ListenerId, LayoutListener)>>,
}

impl FakeTarget {
    pub fn new(width: u32, height: u32) -> Rc<Self> {
        let target = Self::default();
        target.size.set(Size::new(width, height));
        Rc::new(target)
    }

    pub fn at(self: Rc<Self>, x: i32, y: i32) -> Rc<Self> {
        self.location.set(Point::new(x, y));
        self
    }

    pub fn pre_draw_count(&self) -> usize {
        self.pre_draw.borrow().len()
    }

    pub fn layout_count(&self) -> usize {
        self.layout.borrow().len()
    }

    /// Fire every pre-draw listener, as the host does before a frame.
    pub fn fire_pre_draw(&self) -> Vec<Result<(), BlurError>> {
        let listeners: Vec<_> = self.pre_draw.borrow().iter().map(|(_, l)| l.clone()).collect();
        listeners.iter().map(PreDrawListener::on_pre_draw).collect()
    }

    /// Fire every layout listener, as the host does after a layout pass.
    pub fn fire_layout(&self) {
        let listeners: Vec<_> = self.layout.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in &listeners {
            listener.on_global_layout();
        }
    }

    /// Copies of the registered listeners, kept beyond their controller.
    pub fn listeners(&self) -> (Vec<PreDrawListener>, Vec<LayoutListener>) {
        (
            self.pre_draw.borrow().iter().map(|(_, l)| l.clone()).collect(),
            self.layout.borrow().iter().map(|(_, l)| l.clone()).collect(),
        )
    }

    fn next(&self) -> ListenerId {
        self.next_id.set(self.next_id.get() + 1);
        ListenerId(self.next_id.get())
    }
}

impl TargetView for FakeTarget {
    fn measured_size(&self) -> Size {
        self.size.get()
    }

    fn location_on_screen(&self) -> Point {
        self.location.get()
    }

    fn set_will_not_draw(&self, will_not_draw: bool) {
        self.will_not_draw.set(Some(will_not_draw));
    }

    fn invalidate(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
    }

    fn add_pre_draw_listener(&self, listener: PreDrawListener) -> ListenerId {
        let id = self.next();
        self.pre_draw.borrow_mut().push((id, listener));
        id
    }

    fn remove_pre_draw_listener(&self, id: ListenerId) {
        self.pre_draw.borrow_mut().retain(|(l, _)| *l != id);
    }

    fn add_layout_listener(&self, listener: LayoutListener) -> ListenerId {
        let id = self.next();
        self.layout.borrow_mut().push((id, listener));
        id
    }

    fn remove_layout_listener(&self, id: ListenerId) {
        self.layout.borrow_mut().retain(|(l, _)| *l != id);
    }
}

// ============================================================================
// Root view
// ============================================================================

pub enum RootMode {
    /// Fill a large rect with this colour.
    Fill(PackedRgba),
    /// Fail every draw.
    Fail(&'static str),
    /// Try to draw the blur view into the offscreen surface.
    Reenter(WeakBlurHandle),
    /// Destroy the blur view while it is snapshotting.
    Destroy(WeakBlurHandle),
}

pub struct FakeRoot {
    pub location: Cell<Point>,
    pub mode: RefCell<RootMode>,
    pub draws: Cell<u32>,
    pub matrices: RefCell<Vec<Transform>>,
    pub surfaces: RefCell<Vec<SurfaceId>>,
    pub reentry: RefCell<Vec<Result<frost_blur::DrawOutcome, BlurError>>>,
}

impl FakeRoot {
    pub fn new(mode: RootMode) -> Rc<Self> {
        Rc::new(Self {
            location: Cell::new(Point::ORIGIN),
            mode: RefCell::new(mode),
            draws: Cell::new(0),
            matrices: RefCell::new(Vec::new()),
            surfaces: RefCell::new(Vec::new()),
            reentry: RefCell::new(Vec::new()),
        })
    }

    pub fn filling(color: PackedRgba) -> Rc<Self> {
        Self::new(RootMode::Fill(color))
    }
}

impl RootView for FakeRoot {
    fn location_on_screen(&self) -> Point {
        self.location.get()
    }

    fn draw(&self, surface: &mut Surface) -> Result<(), RenderError> {
        self.draws.set(self.draws.get() + 1);
        self.matrices.borrow_mut().push(surface.matrix());
        self.surfaces.borrow_mut().push(surface.id());
        match &*self.mode.borrow() {
            RootMode::Fill(color) => {
                surface.fill_rect(Rect::new(-4000, -4000, 8000, 8000), *color);
                Ok(())
            }
            RootMode::Fail(msg) => Err(RenderError::new(*msg)),
            RootMode::Reenter(weak) => {
                if let Some(handle) = weak.upgrade() {
                    self.reentry.borrow_mut().push(handle.draw(surface));
                }
                Ok(())
            }
            RootMode::Destroy(weak) => {
                if let Some(mut handle) = weak.upgrade() {
                    handle.destroy();
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Blur provider
// ============================================================================

#[derive(Debug, Clone)]
pub enum ProviderMode {
    /// Leave the buffer untouched.
    InPlace,
    /// Return a fresh buffer of the same size filled with this colour.
    Replace(PackedRgba),
    /// Fail every call.
    Fail(ProviderError),
}

#[derive(Debug, Default)]
pub struct ProviderLog {
    pub calls: Cell<u32>,
    pub releases: Cell<u32>,
    pub radii: RefCell<Vec<f32>>,
    pub sizes: RefCell<Vec<Size>>,
}

pub struct RecordingProvider {
    pub mode: ProviderMode,
    pub log: Rc<ProviderLog>,
    /// Reported capability, when it should disagree with `mode`.
    pub claims_in_place: Option<bool>,
}

impl RecordingProvider {
    pub fn new(mode: ProviderMode) -> (Box<Self>, Rc<ProviderLog>) {
        let log = Rc::new(ProviderLog::default());
        (
            Box::new(Self {
                mode,
                log: log.clone(),
                claims_in_place: None,
            }),
            log,
        )
    }

    /// Report `in_place` from `can_modify_in_place` regardless of `mode`.
    pub fn claiming_in_place(mut self: Box<Self>, in_place: bool) -> Box<Self> {
        self.claims_in_place = Some(in_place);
        self
    }
}

impl BlurProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn blur(&mut self, buffer: &mut Pixmap, radius: f32) -> Result<BlurOutput, ProviderError> {
        self.log.calls.set(self.log.calls.get() + 1);
        self.log.radii.borrow_mut().push(radius);
        self.log.sizes.borrow_mut().push(buffer.size());
        match &self.mode {
            ProviderMode::InPlace => Ok(BlurOutput::InPlace),
            ProviderMode::Replace(color) => {
                let mut replacement = Pixmap::new(buffer.width(), buffer.height(), buffer.format());
                replacement.fill(*color);
                Ok(BlurOutput::Replaced(replacement))
            }
            ProviderMode::Fail(err) => Err(err.clone()),
        }
    }

    fn can_modify_in_place(&self) -> bool {
        self.claims_in_place
            .unwrap_or(!matches!(self.mode, ProviderMode::Replace(_)))
    }

    fn supported_pixel_format(&self) -> PixelFormat {
        PixelFormat::Rgba8888
    }

    fn release(&mut self) {
        self.log.releases.set(self.log.releases.get() + 1);
    }
}

// ============================================================================
// Builders
// ============================================================================

pub struct Rig {
    pub handle: BlurHandle,
    pub target: Rc<FakeTarget>,
    pub root: Rc<FakeRoot>,
    pub log: Rc<ProviderLog>,
}

pub fn rig(
    target: Rc<FakeTarget>,
    root: Rc<FakeRoot>,
    mode: ProviderMode,
    config: BlurConfig,
) -> Rig {
    let (provider, log) = RecordingProvider::new(mode);
    let handle = BlurHandle::new(target.clone(), root.clone(), provider, config)
        .expect("valid config");
    Rig {
        handle,
        target,
        root,
        log,
    }
}

pub fn canvas(width: u32, height: u32) -> Surface {
    Surface::new(Pixmap::new(width, height, PixelFormat::Rgba8888))
}
