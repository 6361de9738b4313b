//! # Rendering Module
//!
//! Turns a synthetic pressure series into a printable 1-bit raster.
//!
//! ## Pipeline
//!
//! ```text
//! CurveSynthesizer ──► reduce ──► GraphRenderer ──► FrameBuffer ──► printer
//!   (raw series)      (pixel height)  (grid, labels, curve)   (raster bytes)
//! ```
//!
//! ## Modules
//!
//! - [`framebuffer`]: 1-bpp raster with line and glyph drawing
//! - [`font`]: 5×7 glyph table
//! - [`curve`]: deterministic build-up curve generator
//! - [`reduce`]: max-pool downsampling and moving-average smoothing
//! - [`layout`]: graph geometry
//! - [`graph`]: grid, labels and curve drawing
//! - [`preview`]: PNG export

pub mod curve;
pub mod font;
pub mod framebuffer;
pub mod graph;
pub mod layout;
pub mod preview;
pub mod reduce;

pub use curve::{CurvePattern, CurveSynthesizer, Lcg};
pub use framebuffer::FrameBuffer;
pub use graph::GraphRenderer;
pub use layout::GraphLayout;
