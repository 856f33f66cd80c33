#![forbid(unsafe_code)]

//! Axis-aligned affine transforms (scale + translate, no rotation or skew).
//!
//! A [`Transform`] maps a point `(x, y)` to `(sx * x + tx, sy * y + ty)`.
//! `pre_*` methods compose the way a canvas does: the new operation applies
//! to incoming points *before* the existing matrix, so
//! `Transform::IDENTITY.pre_translate(dx, dy).pre_scale(k, k)` scales first,
//! then translates.

/// Scale-then-translate matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub sx: f32,
    pub sy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Pure translation.
    #[inline]
    pub const fn from_translate(tx: f32, ty: f32) -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx,
            ty,
        }
    }

    /// Pure scale about the origin.
    #[inline]
    pub const fn from_scale(sx: f32, sy: f32) -> Self {
        Self {
            sx,
            sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// `self ∘ translate(dx, dy)`.
    #[inline]
    #[must_use]
    pub fn pre_translate(self, dx: f32, dy: f32) -> Self {
        Self {
            tx: self.sx * dx + self.tx,
            ty: self.sy * dy + self.ty,
            ..self
        }
    }

    /// `self ∘ scale(kx, ky)`.
    #[inline]
    #[must_use]
    pub fn pre_scale(self, kx: f32, ky: f32) -> Self {
        Self {
            sx: self.sx * kx,
            sy: self.sy * ky,
            ..self
        }
    }

    /// `self ∘ other`: `other` is applied first.
    #[inline]
    #[must_use]
    pub fn pre_concat(self, other: Transform) -> Self {
        Self {
            sx: self.sx * other.sx,
            sy: self.sy * other.sy,
            tx: self.sx * other.tx + self.tx,
            ty: self.sy * other.ty + self.ty,
        }
    }

    /// Map a point.
    #[inline]
    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.sx * x + self.tx, self.sy * y + self.ty)
    }

    /// Inverse transform, or `None` when a scale is zero or not finite.
    #[inline]
    pub fn invert(&self) -> Option<Self> {
        if self.sx == 0.0 || self.sy == 0.0 || !self.sx.is_finite() || !self.sy.is_finite() {
            return None;
        }
        let sx = 1.0 / self.sx;
        let sy = 1.0 / self.sy;
        Some(Self {
            sx,
            sy,
            tx: -self.tx * sx,
            ty: -self.ty * sy,
        })
    }

    /// True for the exact identity.
    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}
