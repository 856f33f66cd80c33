#![forbid(unsafe_code)]

//! Mapping from root-view coordinates into the offscreen buffer.
//!
//! The snapshot must contain exactly the part of the hierarchy under the
//! target view, shrunk by the effective scale. With `left/top` the target's
//! offset from the root and `s` the effective scale per axis, the transform
//! is `translate(-left / s, -top / s)` followed by `scale(1 / s)`, i.e. a root
//! point `p` lands at `(p - offset) / s`.

use frost_core::geometry::Point;
use frost_render::Transform;

/// Root-to-offscreen transform for a target at `target` under a root at
/// `root` (both absolute screen positions).
pub fn offscreen_transform(root: Point, target: Point, scale: (f32, f32)) -> Transform {
    let offset = target.offset_from(root);
    let (sx, sy) = scale;
    Transform::IDENTITY
        .pre_translate(-(offset.x as f32) / sx, -(offset.y as f32) / sy)
        .pre_scale(1.0 / sx, 1.0 / sy)
}

/// Dynamic or fixed transform bookkeeping.
///
/// In fixed mode the transform is computed once per initialization and reused
/// every frame. Dynamic mode recomputes it before each snapshot so moving or
/// animating views stay in sync.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformState {
    fixed: bool,
    cached: Option<Transform>,
}

impl TransformState {
    /// Create state in the given mode.
    pub const fn new(fixed: bool) -> Self {
        Self {
            fixed,
            cached: None,
        }
    }

    /// Whether fixed mode is on.
    #[inline]
    pub const fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Switch modes. Leaving fixed mode drops the cached transform.
    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
        if !fixed {
            self.cached = None;
        }
    }

    /// Forget the cached transform (the buffer geometry changed).
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// The cached transform, if any.
    #[inline]
    pub const fn cached(&self) -> Option<Transform> {
        self.cached
    }

    /// Transform for this frame: the cached one in fixed mode, otherwise a
    /// fresh one from `compute`. Fixed mode fills the cache on first use.
    pub fn resolve(&mut self, compute: impl FnOnce() -> Transform) -> Transform {
        if !self.fixed {
            return compute();
        }
        *self.cached.get_or_insert_with(compute)
    }
}
