#![forbid(unsafe_code)]

//! Blur-behind effect for a single target view.
//!
//! A [`SnapshotBlurController`] snapshots the hierarchy under a target view
//! into a downscaled, stride-aligned offscreen buffer, blurs it through a
//! pluggable [`BlurProvider`], and composites the result back at view scale.
//!
//! # Example
//! ```
//! use std::rc::Rc;
//! use frost_blur::{BlurConfig, BlurHandle, BlurViewFacade, BoxBlurProvider};
//! # use frost_blur::host::{LayoutListener, ListenerId, PreDrawListener, RootView, TargetView};
//! # use frost_blur::RenderError;
//! # use frost_core::geometry::{Point, Size};
//! # use frost_render::{PixelFormat, Pixmap, Surface};
//! # struct View;
//! # impl TargetView for View {
//! #     fn measured_size(&self) -> Size { Size::new(320, 240) }
//! #     fn location_on_screen(&self) -> Point { Point::ORIGIN }
//! #     fn set_will_not_draw(&self, _: bool) {}
//! #     fn invalidate(&self) {}
//! #     fn add_pre_draw_listener(&self, _: PreDrawListener) -> ListenerId { ListenerId(1) }
//! #     fn remove_pre_draw_listener(&self, _: ListenerId) {}
//! #     fn add_layout_listener(&self, _: LayoutListener) -> ListenerId { ListenerId(2) }
//! #     fn remove_layout_listener(&self, _: ListenerId) {}
//! # }
//! # struct Root;
//! # impl RootView for Root {
//! #     fn location_on_screen(&self) -> Point { Point::ORIGIN }
//! #     fn draw(&self, _: &mut Surface) -> Result<(), RenderError> { Ok(()) }
//! # }
//! let mut blur = BlurHandle::new(
//!     Rc::new(View),
//!     Rc::new(Root),
//!     Box::new(BoxBlurProvider::new()),
//!     BlurConfig::default(),
//! )?;
//! blur.set_blur_radius(12.0).set_fixed_transform(true);
//!
//! let mut canvas = Surface::new(Pixmap::new(320, 240, PixelFormat::Rgba8888));
//! assert!(blur.draw(&mut canvas)?.is_handled());
//! # Ok::<(), frost_blur::BlurError>(())
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod facade;
pub mod handle;
pub mod host;
pub mod provider;
pub mod sizing;
pub mod transform;

pub use config::BlurConfig;
pub use controller::{BlurStats, DrawOutcome, EffectState, SnapshotBlurController, UpdateOutcome};
pub use error::{BlurError, ProviderError, RenderError};
pub use facade::BlurViewFacade;
pub use handle::{BlurHandle, WeakBlurHandle};
pub use host::{ClearDrawable, RootView, TargetView};
pub use provider::{BlurOutput, BlurProvider, BoxBlurProvider};
pub use sizing::{BufferGeometry, ScaleCorrection};
