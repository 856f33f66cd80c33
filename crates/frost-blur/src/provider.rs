#![forbid(unsafe_code)]

//! The blur backend capability.
//!
//! A provider receives temporary mutable access to the offscreen buffer
//! during the blur step. It either blurs in place or hands back a
//! replacement buffer, which the controller adopts; it never keeps the
//! buffer past the call.

use frost_render::blur::BoxBlur;
use frost_render::{PixelFormat, Pixmap};

use crate::error::ProviderError;

/// Result of one blur call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlurOutput {
    /// The input buffer now holds the blurred image.
    InPlace,
    /// The blurred image is in a new buffer; the caller must adopt it.
    Replaced(Pixmap),
}

/// Blur backend used by the controller.
pub trait BlurProvider {
    /// Human-readable backend name (used in logs).
    fn name(&self) -> &'static str {
        "blur"
    }

    /// Blur `buffer` with `radius` (in buffer pixels).
    fn blur(&mut self, buffer: &mut Pixmap, radius: f32) -> Result<BlurOutput, ProviderError>;

    /// Whether [`BlurProvider::blur`] writes into the buffer it is given.
    ///
    /// `true` means `blur` returns [`BlurOutput::InPlace`]; `false` means it
    /// returns [`BlurOutput::Replaced`]. The controller rejects any other
    /// combination.
    fn can_modify_in_place(&self) -> bool;

    /// Pixel format the offscreen buffer must be allocated in.
    fn supported_pixel_format(&self) -> PixelFormat;

    /// Free backend resources. Called once when the effect is destroyed.
    fn release(&mut self);
}

/// CPU provider backed by [`BoxBlur`]. Blurs in place.
#[derive(Debug, Clone)]
pub struct BoxBlurProvider {
    kernel: BoxBlur,
    format: PixelFormat,
}

impl Default for BoxBlurProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxBlurProvider {
    /// Provider for RGBA buffers with the default pass count.
    pub fn new() -> Self {
        Self {
            kernel: BoxBlur::new(),
            format: PixelFormat::Rgba8888,
        }
    }

    /// Use `passes` box passes per blur.
    #[must_use]
    pub fn with_passes(mut self, passes: u32) -> Self {
        self.kernel = self.kernel.with_passes(passes);
        self
    }

    /// Accept buffers in `format` instead of RGBA.
    #[must_use]
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }
}

impl BlurProvider for BoxBlurProvider {
    fn name(&self) -> &'static str {
        "box"
    }

    fn blur(&mut self, buffer: &mut Pixmap, radius: f32) -> Result<BlurOutput, ProviderError> {
        if buffer.format() != self.format {
            return Err(ProviderError::UnsupportedFormat(buffer.format()));
        }
        self.kernel.apply(buffer, radius);
        Ok(BlurOutput::InPlace)
    }

    fn can_modify_in_place(&self) -> bool {
        true
    }

    fn supported_pixel_format(&self) -> PixelFormat {
        self.format
    }

    fn release(&mut self) {
        self.kernel.release();
    }
}
