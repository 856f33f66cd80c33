#![forbid(unsafe_code)]

//! Separable box blur over a [`Pixmap`].
//!
//! Each pass runs a sliding-window average horizontally, then vertically, in
//! premultiplied space so transparent pixels do not bleed their colour.
//! Edges clamp to the nearest in-bounds pixel. Two or three passes
//! approximate a Gaussian of the same radius.
//!
//! Scratch buffers are kept between calls; reusing one `BoxBlur` per
//! offscreen buffer avoids per-frame allocation once sizes settle.

use crate::pixmap::Pixmap;

type Premul = [u32; 4];

/// Reusable box blur kernel.
#[derive(Debug, Clone)]
pub struct BoxBlur {
    passes: u32,
    plane: Vec<Premul>,
    line_in: Vec<Premul>,
    line_out: Vec<Premul>,
}

impl Default for BoxBlur {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxBlur {
    /// Default number of passes.
    pub const DEFAULT_PASSES: u32 = 2;

    /// Create a kernel with [`Self::DEFAULT_PASSES`].
    pub fn new() -> Self {
        Self {
            passes: Self::DEFAULT_PASSES,
            plane: Vec::new(),
            line_in: Vec::new(),
            line_out: Vec::new(),
        }
    }

    /// Set the number of passes (0 disables blurring).
    #[must_use]
    pub fn with_passes(mut self, passes: u32) -> Self {
        self.passes = passes;
        self
    }

    /// Number of passes.
    #[inline]
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Drop the scratch buffers.
    pub fn release(&mut self) {
        self.plane = Vec::new();
        self.line_in = Vec::new();
        self.line_out = Vec::new();
    }

    /// Blur `pixmap` in place. The radius is rounded to whole pixels;
    /// non-positive or non-finite radii leave the pixmap untouched.
    pub fn apply(&mut self, pixmap: &mut Pixmap, radius: f32) {
        if !radius.is_finite() || self.passes == 0 {
            return;
        }
        let r = radius.round();
        if r < 1.0 {
            return;
        }
        let span = frost_core::trace_span!(
            target: "frost.render",
            "box_blur",
            w = pixmap.width(),
            h = pixmap.height(),
            radius = r
        );
        let _guard = span.enter();

        let width = pixmap.width() as usize;
        let height = pixmap.height() as usize;
        let r = (r as usize).min(width.max(height));

        self.plane.clear();
        self.plane
            .extend(pixmap.pixels().iter().map(|c| c.to_premultiplied()));

        for _ in 0..self.passes {
            self.horizontal(width, height, r);
            self.vertical(width, height, r);
        }

        let format = pixmap.format();
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(&self.plane) {
            *dst = format.normalize(crate::color::PackedRgba::from_premultiplied(*src));
        }
    }

    fn horizontal(&mut self, width: usize, height: usize, r: usize) {
        self.line_out.resize(width, [0; 4]);
        for y in 0..height {
            let row = &mut self.plane[y * width..(y + 1) * width];
            box_line(row, &mut self.line_out, r);
            row.copy_from_slice(&self.line_out);
        }
    }

    fn vertical(&mut self, width: usize, height: usize, r: usize) {
        self.line_in.resize(height, [0; 4]);
        self.line_out.resize(height, [0; 4]);
        for x in 0..width {
            for y in 0..height {
                self.line_in[y] = self.plane[y * width + x];
            }
            box_line(&self.line_in, &mut self.line_out, r);
            for y in 0..height {
                self.plane[y * width + x] = self.line_out[y];
            }
        }
    }
}

/// Sliding-window mean of `input` into `output` with clamp-to-edge.
fn box_line(input: &[Premul], output: &mut [Premul], r: usize) {
    let len = input.len();
    if len == 0 {
        return;
    }
    let last = len - 1;
    let window = (2 * r + 1) as u32;
    let half = window / 2;
    let at = |i: isize| input[i.clamp(0, last as isize) as usize];

    let mut sum = [0u32; 4];
    for k in -(r as isize)..=(r as isize) {
        let px = at(k);
        for c in 0..4 {
            sum[c] += px[c];
        }
    }

    for (i, out) in output.iter_mut().enumerate().take(len) {
        for c in 0..4 {
            out[c] = (sum[c] + half) / window;
        }
        let add = at(i as isize + r as isize + 1);
        let sub = at(i as isize - r as isize);
        for c in 0..4 {
            sum[c] = sum[c] + add[c] - sub[c];
        }
    }
}
