//! Raster primitives for planmark: RGBA pixel buffers, flood fill,
//! letterbox placement and text rasterization.

pub mod buffer;
pub mod color;
pub mod error;
pub mod fill;
pub mod placement;
pub mod text;

pub use buffer::PixelBuffer;
pub use color::Rgba;
pub use error::{RasterError, Result};
pub use fill::{apply_fill, flood_fill};
pub use placement::{Placement, render_letterboxed};
pub use text::{EstimatedMetrics, GlyphFont, TextMeasure, TextStyle};
