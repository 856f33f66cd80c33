#![forbid(unsafe_code)]

//! Offscreen buffer sizing.
//!
//! The snapshot is taken at `1 / downscale_factor` of the view size and then
//! padded up to the alignment stride, which some blur backends need to avoid
//! an internal copy for unaligned rows. The padding is compensated by a
//! per-axis [`ScaleCorrection`] so the composite lands at view scale.
//!
//! # Invariants
//!
//! 1. `align_to_stride(v, s) % s == 0` and `align_to_stride(v, s) - s < v <= align_to_stride(v, s)`
//!    for `v > 0` whenever the next multiple fits in `u32`; beyond that
//!    [`align_to_stride`] saturates and [`checked_align_to_stride`] returns `None`
//! 2. `align_to_stride(v, s) == v` iff `v % s == 0`
//! 3. [`BufferGeometry::compute`] never yields an empty or unaligned buffer
//! 4. Correction factors lie in `(0, 1]`

use frost_core::geometry::Size;

use crate::config::BlurConfig;

/// `ceil(value / factor)`, saturating at `u32::MAX`.
#[inline]
pub fn downscale_dimension(value: u32, factor: f32) -> u32 {
    (f64::from(value) / f64::from(factor)).ceil() as u32
}

/// Round `value` up to the next multiple of `stride`; exact multiples are
/// returned unchanged. A zero stride disables alignment.
///
/// Saturates at `u32::MAX`, which is not stride-aligned; use
/// [`checked_align_to_stride`] where that matters.
#[inline]
pub fn align_to_stride(value: u32, stride: u32) -> u32 {
    checked_align_to_stride(value, stride).unwrap_or(u32::MAX)
}

/// [`align_to_stride`], or `None` when the next multiple overflows `u32`.
#[inline]
pub fn checked_align_to_stride(value: u32, stride: u32) -> Option<u32> {
    if stride == 0 || value % stride == 0 {
        return Some(value);
    }
    (value - value % stride).checked_add(stride)
}

/// Ratio of the ideal downscaled size to the aligned buffer size, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleCorrection {
    pub width: f32,
    pub height: f32,
}

impl Default for ScaleCorrection {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ScaleCorrection {
    /// No correction.
    pub const IDENTITY: Self = Self {
        width: 1.0,
        height: 1.0,
    };

    /// Correction between an ideal size and its aligned counterpart.
    ///
    /// Both sizes must be non-empty.
    #[inline]
    pub fn between(ideal: Size, aligned: Size) -> Self {
        Self {
            width: ideal.width as f32 / aligned.width as f32,
            height: ideal.height as f32 / aligned.height as f32,
        }
    }
}

/// Everything derived from a measured view size for one allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferGeometry {
    /// View size as measured by the host.
    pub measured: Size,
    /// `ceil(measured / downscale_factor)` per axis.
    pub downscaled: Size,
    /// `downscaled` rounded up to the alignment stride: the buffer size.
    pub aligned: Size,
    /// `downscaled / aligned` per axis.
    pub correction: ScaleCorrection,
    /// `downscale_factor * correction` per axis.
    pub effective_scale: (f32, f32),
}

impl BufferGeometry {
    /// Derive the geometry for `measured`, or `None` when either downscaled
    /// dimension is zero (the view has not been laid out yet) or cannot be
    /// aligned within `u32`.
    pub fn compute(measured: Size, config: &BlurConfig) -> Option<Self> {
        let factor = config.downscale_factor;
        let downscaled = Size::new(
            downscale_dimension(measured.width, factor),
            downscale_dimension(measured.height, factor),
        );
        if downscaled.is_empty() {
            return None;
        }
        let aligned = Size::new(
            checked_align_to_stride(downscaled.width, config.alignment_stride)?,
            checked_align_to_stride(downscaled.height, config.alignment_stride)?,
        );
        let correction = ScaleCorrection::between(downscaled, aligned);
        Some(Self {
            measured,
            downscaled,
            aligned,
            correction,
            effective_scale: (factor * correction.width, factor * correction.height),
        })
    }

    /// Whether `other` needs a buffer of the same size and the same scale
    /// correction. The measured size may differ.
    #[inline]
    pub fn same_allocation(&self, other: &Self) -> bool {
        self.downscaled == other.downscaled && self.aligned == other.aligned
    }

    /// On-screen extent of the aligned buffer once composited at
    /// `effective_scale`. Equals `downscaled * downscale_factor`, which covers
    /// the measured size with less than one downscale step of overhang.
    pub fn composite_extent(&self) -> (f32, f32) {
        (
            self.aligned.width as f32 * self.effective_scale.0,
            self.aligned.height as f32 * self.effective_scale.1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn downscale_rounds_up() {
        assert_eq!(downscale_dimension(300, 8.0), 38);
        assert_eq!(downscale_dimension(450, 8.0), 57);
        assert_eq!(downscale_dimension(200, 8.0), 25);
        assert_eq!(downscale_dimension(8, 8.0), 1);
        assert_eq!(downscale_dimension(1, 8.0), 1);
        assert_eq!(downscale_dimension(0, 8.0), 0);
    }

    #[test]
    fn align_rounds_up_unless_exact() {
        assert_eq!(align_to_stride(38, 64), 64);
        assert_eq!(align_to_stride(64, 64), 64);
        assert_eq!(align_to_stride(65, 64), 128);
        assert_eq!(align_to_stride(1, 64), 64);
        assert_eq!(align_to_stride(0, 64), 0);
        assert_eq!(align_to_stride(7, 0), 7);
    }

    #[test]
    fn align_overflow_saturates_or_fails() {
        assert_eq!(align_to_stride(u32::MAX, 64), u32::MAX);
        assert_eq!(checked_align_to_stride(u32::MAX, 64), None);
        assert_eq!(checked_align_to_stride(u32::MAX - 63, 64), Some(u32::MAX - 63));
        assert_eq!(checked_align_to_stride(u32::MAX, 1), Some(u32::MAX));
    }

    #[test]
    fn unalignable_size_yields_none() {
        let cfg = BlurConfig::default().with_downscale_factor(1.0);
        assert!(BufferGeometry::compute(Size::new(u32::MAX, 64), &cfg).is_none());
        assert!(BufferGeometry::compute(Size::new(u32::MAX - 63, 64), &cfg).is_some());
    }

    #[test]
    fn same_allocation_ignores_measured_size() {
        let cfg = BlurConfig::default();
        let a = BufferGeometry::compute(Size::new(300, 450), &cfg).unwrap();
        let b = BufferGeometry::compute(Size::new(301, 450), &cfg).unwrap();
        let c = BufferGeometry::compute(Size::new(305, 450), &cfg).unwrap();
        assert_ne!(a, b);
        assert!(a.same_allocation(&b));
        // 305 downscales to 39: same buffer, different correction.
        assert_eq!(c.aligned, a.aligned);
        assert!(!a.same_allocation(&c));
    }

    #[test]
    fn geometry_for_300x450() {
        let g = BufferGeometry::compute(Size::new(300, 450), &BlurConfig::default()).unwrap();
        assert_eq!(g.downscaled, Size::new(38, 57));
        assert_eq!(g.aligned, Size::new(64, 64));
        assert!(approx(g.correction.width, 0.594));
        assert!(approx(g.correction.height, 0.891));
        assert!(approx(g.effective_scale.0, 4.75));
        assert!(approx(g.effective_scale.1, 7.125));
    }

    #[test]
    fn composite_extent_covers_measured_size() {
        let g = BufferGeometry::compute(Size::new(300, 450), &BlurConfig::default()).unwrap();
        let (w, h) = g.composite_extent();
        assert!(approx(w, 304.0));
        assert!(approx(h, 456.0));
    }

    #[test]
    fn zero_downscaled_dimension_yields_none() {
        let cfg = BlurConfig::default();
        assert!(BufferGeometry::compute(Size::new(0, 0), &cfg).is_none());
        assert!(BufferGeometry::compute(Size::new(0, 100), &cfg).is_none());
        assert!(BufferGeometry::compute(Size::new(100, 0), &cfg).is_none());
        assert!(BufferGeometry::compute(Size::new(1, 1), &cfg).is_some());
    }

    #[test]
    fn exact_multiple_needs_no_correction() {
        let g = BufferGeometry::compute(Size::new(512, 1024), &BlurConfig::default()).unwrap();
        assert_eq!(g.aligned, Size::new(64, 128));
        assert_eq!(g.correction, ScaleCorrection::IDENTITY);
    }

    mod property {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn correction_in_unit_interval(
                w in 1u32..10_000,
                h in 1u32..10_000,
                factor in 1.0f32..32.0,
                stride in 1u32..256,
            ) {
                let cfg = BlurConfig::default()
                    .with_downscale_factor(factor)
                    .with_alignment_stride(stride);
                let g = BufferGeometry::compute(Size::new(w, h), &cfg).unwrap();
                prop_assert!(g.correction.width > 0.0 && g.correction.width <= 1.0);
                prop_assert!(g.correction.height > 0.0 && g.correction.height <= 1.0);
                prop_assert!(!g.aligned.is_empty());
            }
        }
    }
}
