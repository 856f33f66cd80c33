#![forbid(unsafe_code)]

//! Drawing surface bound to a [`Pixmap`].
//!
//! A `Surface` is the canvas a view hierarchy draws into. It owns its target
//! pixmap, carries a current [`Transform`] plus a save/restore stack, and
//! composites with SourceOver.
//!
//! # Invariants
//!
//! 1. Every surface has a process-unique [`SurfaceId`], kept across rebinds
//! 2. `restore()` never pops past the base state
//! 3. Draw calls never write outside the pixmap bounds

use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use crate::color::PackedRgba;
use crate::pixmap::Pixmap;
use crate::transform::Transform;
use frost_core::geometry::Rect;

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a drawing surface, stable for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    fn next() -> Self {
        Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Sampling used when a pixmap is drawn under a scaling transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest source pixel.
    #[default]
    Nearest,
    /// Bilinear interpolation in premultiplied space, clamped at the edges.
    Bilinear,
}

/// A canvas over an owned pixmap.
#[derive(Debug)]
pub struct Surface {
    id: SurfaceId,
    pixmap: Pixmap,
    matrix: Transform,
    save_stack: SmallVec<[Transform; 4]>,
}

impl Surface {
    /// Bind a new surface to `pixmap`.
    pub fn new(pixmap: Pixmap) -> Self {
        Self {
            id: SurfaceId::next(),
            pixmap,
            matrix: Transform::IDENTITY,
            save_stack: SmallVec::new(),
        }
    }

    /// This surface's identity.
    #[inline]
    pub const fn id(&self) -> SurfaceId {
        self.id
    }

    /// The bound pixmap.
    #[inline]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// The bound pixmap, mutably.
    #[inline]
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Bind a different pixmap, returning the previous one.
    ///
    /// The matrix and the save stack are reset; the [`SurfaceId`] is kept.
    pub fn rebind(&mut self, pixmap: Pixmap) -> Pixmap {
        self.matrix = Transform::IDENTITY;
        self.save_stack.clear();
        std::mem::replace(&mut self.pixmap, pixmap)
    }

    // ========== Matrix Stack ==========

    /// Push the current matrix. Returns the depth after the push.
    pub fn save(&mut self) -> usize {
        self.save_stack.push(self.matrix);
        self.save_stack.len()
    }

    /// Pop the most recent save. Does nothing at the base state.
    pub fn restore(&mut self) {
        if let Some(matrix) = self.save_stack.pop() {
            self.matrix = matrix;
        }
    }

    /// Number of outstanding saves.
    #[inline]
    pub fn save_depth(&self) -> usize {
        self.save_stack.len()
    }

    /// Current matrix.
    #[inline]
    pub fn matrix(&self) -> Transform {
        self.matrix
    }

    /// Pre-concatenate a translation.
    #[inline]
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.matrix = self.matrix.pre_translate(dx, dy);
    }

    /// Pre-concatenate a scale.
    #[inline]
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.matrix = self.matrix.pre_scale(sx, sy);
    }

    /// Pre-concatenate an arbitrary transform.
    #[inline]
    pub fn concat(&mut self, transform: Transform) {
        self.matrix = self.matrix.pre_concat(transform);
    }

    // ========== Drawing ==========

    /// Replace every pixel with `color`, ignoring the matrix.
    pub fn clear(&mut self, color: PackedRgba) {
        self.pixmap.fill(color);
    }

    /// Composite `color` over every pixel (a full-surface tint).
    pub fn draw_color(&mut self, color: PackedRgba) {
        if color.is_transparent() {
            return;
        }
        let format = self.pixmap.format();
        for px in self.pixmap.pixels_mut() {
            *px = format.normalize(color.over(*px));
        }
    }

    /// Device pixel span covered by `[lo, hi)` under pixel-centre sampling.
    #[inline]
    fn device_span(lo: f32, hi: f32, limit: u32) -> (u32, u32) {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let start = (lo - 0.5).ceil().clamp(0.0, limit as f32) as u32;
        let end = (hi - 0.5).ceil().clamp(0.0, limit as f32) as u32;
        (start, end)
    }

    /// Composite `color` over `rect` (local coordinates, mapped by the matrix).
    pub fn fill_rect(&mut self, rect: Rect, color: PackedRgba) {
        if rect.is_empty() || color.is_transparent() {
            return;
        }
        let (x0, y0) = self.matrix.map_point(rect.x as f32, rect.y as f32);
        let (x1, y1) = self
            .matrix
            .map_point(rect.right() as f32, rect.bottom() as f32);
        let (cx0, cx1) = Self::device_span(x0, x1, self.pixmap.width());
        let (cy0, cy1) = Self::device_span(y0, y1, self.pixmap.height());

        for y in cy0..cy1 {
            for x in cx0..cx1 {
                if let Some(dst) = self.pixmap.get(x, y) {
                    self.pixmap.set(x, y, color.over(dst));
                }
            }
        }
    }

    /// Composite `src` with its top-left at local `(left, top)`, mapped by the matrix.
    pub fn draw_pixmap(&mut self, src: &Pixmap, left: f32, top: f32, filter: FilterMode) {
        let Some(inverse) = self.matrix.invert() else {
            return;
        };
        let (x0, y0) = self.matrix.map_point(left, top);
        let (x1, y1) = self
            .matrix
            .map_point(left + src.width() as f32, top + src.height() as f32);
        let (cx0, cx1) = Self::device_span(x0, x1, self.pixmap.width());
        let (cy0, cy1) = Self::device_span(y0, y1, self.pixmap.height());

        for y in cy0..cy1 {
            for x in cx0..cx1 {
                let (lx, ly) = inverse.map_point(x as f32 + 0.5, y as f32 + 0.5);
                let (u, v) = (lx - left, ly - top);
                let sample = match filter {
                    FilterMode::Nearest => sample_nearest(src, u, v),
                    FilterMode::Bilinear => sample_bilinear(src, u, v),
                };
                if let (Some(color), Some(dst)) = (sample, self.pixmap.get(x, y)) {
                    self.pixmap.set(x, y, color.over(dst));
                }
            }
        }
    }
}

fn sample_nearest(src: &Pixmap, u: f32, v: f32) -> Option<PackedRgba> {
    if u < 0.0 || v < 0.0 {
        return None;
    }
    src.get(u.floor() as u32, v.floor() as u32)
}

fn sample_bilinear(src: &Pixmap, u: f32, v: f32) -> Option<PackedRgba> {
    if u < 0.0 || v < 0.0 || u >= src.width() as f32 || v >= src.height() as f32 {
        return None;
    }
    let max_x = (src.width() - 1) as f32;
    let max_y = (src.height() - 1) as f32;
    let fx = (u - 0.5).clamp(0.0, max_x);
    let fy = (v - 0.5).clamp(0.0, max_y);
    let (x0, y0) = (fx.floor(), fy.floor());
    let (x1, y1) = ((x0 + 1.0).min(max_x), (y0 + 1.0).min(max_y));
    let (tx, ty) = (fx - x0, fy - y0);

    let texel = |x: f32, y: f32| {
        src.get(x as u32, y as u32)
            .unwrap_or_default()
            .to_premultiplied()
    };
    let (p00, p10, p01, p11) = (texel(x0, y0), texel(x1, y0), texel(x0, y1), texel(x1, y1));

    let mut out = [0u32; 4];
    for c in 0..4 {
        let top = p00[c] as f32 * (1.0 - tx) + p10[c] as f32 * tx;
        let bottom = p01[c] as f32 * (1.0 - tx) + p11[c] as f32 * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round() as u32;
    }
    Some(PackedRgba::from_premultiplied(out))
}
