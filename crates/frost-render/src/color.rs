#![forbid(unsafe_code)]

//! Packed pixel colour.

/// A compact RGBA color, one per pixel.
///
/// - **Size:** 4 bytes.
/// - **Layout:** `0xRRGGBBAA` (R in bits 31..24, A in bits 7..0).
///
/// Storage is **straight alpha** (RGB channels are not pre-multiplied).
/// Compositing uses Porter-Duff **SourceOver** (`src over dst`). Filtering
/// (blur, bilinear sampling) goes through [`PackedRgba::to_premultiplied`] so
/// transparent neighbours do not bleed their RGB into the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    /// Fully transparent (alpha = 0).
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Create an opaque RGB color (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create an RGBA color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Red channel.
    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Alpha channel.
    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// True when alpha is zero (RGB is irrelevant).
    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.a() == 0
    }

    /// Porter-Duff SourceOver: `src over dst`.
    ///
    /// Each side contributes its colour weighted by its effective coverage
    /// (`255 * a_src` and `a_dst * (255 - a_src)`); the blend is exact until a
    /// single final rounding.
    #[inline]
    pub fn over(self, dst: Self) -> Self {
        match self.a() {
            255 => return self,
            0 => return dst,
            _ => {}
        }
        let src_weight = u64::from(self.a()) * 255;
        let dst_weight = u64::from(dst.a()) * u64::from(255 - self.a());
        let coverage = src_weight + dst_weight;
        let blend = |s: u8, d: u8| {
            rounded_ratio(
                u64::from(s) * src_weight + u64::from(d) * dst_weight,
                coverage,
            )
        };
        Self::rgba(
            blend(self.r(), dst.r()),
            blend(self.g(), dst.g()),
            blend(self.b(), dst.b()),
            rounded_ratio(coverage, 255),
        )
    }

    /// Premultiplied channels `[r*a, g*a, b*a, a]`, each scaled to `0..=255`.
    #[inline]
    pub fn to_premultiplied(self) -> [u32; 4] {
        let a = self.a() as u32;
        let mul = |c: u8| (c as u32 * a + 127) / 255;
        [mul(self.r()), mul(self.g()), mul(self.b()), a]
    }

    /// Inverse of [`PackedRgba::to_premultiplied`]; inputs are clamped to `0..=255`.
    #[inline]
    pub fn from_premultiplied([r, g, b, a]: [u32; 4]) -> Self {
        let a = a.min(255);
        if a == 0 {
            return Self::TRANSPARENT;
        }
        let un = |c: u32| ((c.min(a) * 255 + a / 2) / a).min(255) as u8;
        Self::rgba(un(r), un(g), un(b), a as u8)
    }
}

/// `numer / denom` rounded half up, saturating at 255.
#[inline]
fn rounded_ratio(numer: u64, denom: u64) -> u8 {
    ((numer + denom / 2) / denom).min(255) as u8
}
