//! Mutable RGBA pixel buffer.
//!
//! The buffer is the substrate every edit acts on. It owns its bytes
//! exclusively: `Clone` is a deep copy, so a buffer stored in history can never
//! be mutated through the live canvas.

use image::RgbaImage;

use crate::color::Rgba;
use crate::error::{RasterError, Result};

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Row-major RGBA buffer, 4 bytes per pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    /// Buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let pixel_count = width as usize * height as usize;
        let data = color
            .to_array()
            .iter()
            .copied()
            .cycle()
            .take(pixel_count * BYTES_PER_PIXEL)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGBA bytes. Fails if the length does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(RasterError::BadDimensions {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        // Length is guaranteed by construction.
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
        } else {
            None
        }
    }

    /// Read a pixel, or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        let i = self.offset(x, y)?;
        Some(Rgba::from_slice(&self.data[i..i + BYTES_PER_PIXEL]))
    }

    /// Write a pixel. Returns `OutOfBounds` outside the buffer.
    pub fn set(&mut self, x: u32, y: u32, color: Rgba) -> Result<()> {
        let Some(i) = self.offset(x, y) else {
            return Err(RasterError::OutOfBounds {
                x: i64::from(x),
                y: i64::from(y),
                width: self.width,
                height: self.height,
            });
        };
        self.data[i..i + BYTES_PER_PIXEL].copy_from_slice(&color.to_array());
        Ok(())
    }

    /// Write a pixel, silently ignoring out-of-bounds coordinates.
    /// Returns whether the pixel was written.
    pub fn put(&mut self, x: u32, y: u32, color: Rgba) -> bool {
        self.set(x, y, color).is_ok()
    }

    /// Blend `color` over the pixel at (x, y) using `coverage` in 0.0-1.0.
    pub fn blend(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        let Some(dst) = self.get(x, y) else {
            return;
        };
        let src_alpha = f32::from(color.a) / 255.0 * coverage.clamp(0.0, 1.0);
        let blended = source_over(dst, color, src_alpha);
        self.put(x, y, blended);
    }

    /// Paint `overlay` on top of this buffer (source-over) and return the result.
    pub fn composite(&self, overlay: &PixelBuffer) -> Result<PixelBuffer> {
        if self.dimensions() != overlay.dimensions() {
            return Err(RasterError::DimensionMismatch {
                left_width: self.width,
                left_height: self.height,
                right_width: overlay.width,
                right_height: overlay.height,
            });
        }

        let mut out = self.clone();
        for (dst, src) in out
            .data
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(overlay.data.chunks_exact(BYTES_PER_PIXEL))
        {
            let src = Rgba::from_slice(src);
            if src.a == 0 {
                continue;
            }
            let blended = source_over(Rgba::from_slice(dst), src, f32::from(src.a) / 255.0);
            dst.copy_from_slice(&blended.to_array());
        }
        Ok(out)
    }

    /// Compare two buffers by sampling every `stride_pixels`-th pixel's first byte.
    ///
    /// Dimensions must match exactly. Changes that fall entirely between
    /// sampled offsets are not detected; a stride of 1 checks the red channel
    /// of every pixel.
    pub fn sampled_eq(&self, other: &PixelBuffer, stride_pixels: usize) -> bool {
        if self.dimensions() != other.dimensions() {
            return false;
        }
        let stride = stride_pixels.max(1) * BYTES_PER_PIXEL;
        self.data
            .iter()
            .step_by(stride)
            .zip(other.data.iter().step_by(stride))
            .all(|(a, b)| a == b)
    }

    /// Count pixels equal to `color`.
    pub fn count_color(&self, color: Rgba) -> usize {
        let target = color.to_array();
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .filter(|px| *px == target)
            .count()
    }
}

fn source_over(dst: Rgba, src: Rgba, src_alpha: f32) -> Rgba {
    let dst_alpha = f32::from(dst.a) / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha <= f32::EPSILON {
        return Rgba::TRANSPARENT;
    }

    let channel = |s: u8, d: u8| {
        let v = (f32::from(s) * src_alpha + f32::from(d) * dst_alpha * (1.0 - src_alpha))
            / out_alpha;
        v.round().clamp(0.0, 255.0) as u8
    };

    Rgba::new(
        channel(src.r, dst.r),
        channel(src.g, dst.g),
        channel(src.b, dst.b),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}
