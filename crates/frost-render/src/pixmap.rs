#![forbid(unsafe_code)]

//! Offscreen pixel storage.
//!
//! A [`Pixmap`] is a 2D grid of [`PackedRgba`] pixels in row-major order:
//! `index = y * width + x`.
//!
//! # Invariants
//!
//! 1. `pixels.len() == width * height`
//! 2. Width and height are non-zero and never change after creation
//! 3. Every stored pixel is representable in the pixmap's [`PixelFormat`]

use crate::color::PackedRgba;
use frost_core::geometry::Size;

/// Pixel layout a blur backend expects for its input.
///
/// Pixels are always held as [`PackedRgba`] in memory; the format decides
/// which values are representable (writes are quantised on store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelFormat {
    /// 8 bits per channel with alpha.
    #[default]
    Rgba8888,
    /// Opaque 5/6/5 bit colour.
    Rgb565,
    /// Alpha only; colour channels read back as zero.
    Alpha8,
}

impl PixelFormat {
    /// Quantise a colour to what this format can hold.
    #[inline]
    pub fn normalize(self, color: PackedRgba) -> PackedRgba {
        match self {
            Self::Rgba8888 => color,
            Self::Rgb565 => {
                let expand5 = |c: u8| {
                    let v = c >> 3;
                    (v << 3) | (v >> 2)
                };
                let expand6 = |c: u8| {
                    let v = c >> 2;
                    (v << 2) | (v >> 4)
                };
                PackedRgba::rgb(expand5(color.r()), expand6(color.g()), expand5(color.b()))
            }
            Self::Alpha8 => PackedRgba::rgba(0, 0, 0, color.a()),
        }
    }
}

/// A row-major pixel store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<PackedRgba>,
}

impl Pixmap {
    /// Allocate a pixmap cleared to transparent (or the format's nearest value).
    ///
    /// # Panics
    ///
    /// Panics if width or height is 0.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        assert!(width > 0, "pixmap width must be > 0");
        assert!(height > 0, "pixmap height must be > 0");

        let len = width as usize * height as usize;
        frost_core::debug!(target: "frost.render", width, height, ?format, "pixmap allocated");
        Self {
            width,
            height,
            format,
            pixels: vec![format.normalize(PackedRgba::TRANSPARENT); len],
        }
    }

    /// Allocate a pixmap of the given size, or `None` if either side is 0.
    pub fn with_size(size: Size, format: PixelFormat) -> Option<Self> {
        if size.is_empty() {
            None
        } else {
            Some(Self::new(size.width, size.height, format))
        }
    }

    /// Width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a [`Size`].
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Pixel format.
    #[inline]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always false for a constructed pixmap.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Pixel at (x, y), or `None` out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<PackedRgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Store a pixel, quantised to the format. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: PackedRgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = self.format.normalize(color);
        }
    }

    /// Replace every pixel with `color` (no blending).
    pub fn fill(&mut self, color: PackedRgba) {
        self.pixels.fill(self.format.normalize(color));
    }

    /// Read-only pixel slice.
    #[inline]
    pub fn pixels(&self) -> &[PackedRgba] {
        &self.pixels
    }

    /// Mutable pixel slice.
    ///
    /// Writers are responsible for keeping values representable in the format.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [PackedRgba] {
        &mut self.pixels
    }

}
