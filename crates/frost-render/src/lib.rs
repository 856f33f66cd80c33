#![forbid(unsafe_code)]

//! Render: colours, pixmaps, transforms and the software canvas the blur
//! controller draws through.
//!
//! # Role in frost
//! `frost-render` is the drawing kernel. It knows nothing about views or
//! controllers; `frost-blur` builds the snapshot pipeline on top of it.
//!
//! # Primary responsibilities
//! - **PackedRgba**: straight-alpha colour with exact SourceOver.
//! - **Pixmap**: row-major pixel store tagged with a [`pixmap::PixelFormat`].
//! - **Transform**: scale + translate matrix with canvas-style `pre_*` composition.
//! - **Surface**: canvas over a pixmap with a save/restore stack.
//! - **BoxBlur**: separable premultiplied box blur used as the reference backend.

pub mod blur;
pub mod color;
pub mod pixmap;
pub mod surface;
pub mod transform;

pub use color::PackedRgba;
pub use pixmap::{PixelFormat, Pixmap};
pub use surface::{FilterMode, Surface, SurfaceId};
pub use transform::Transform;
