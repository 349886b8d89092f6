//! Letterbox placement of a source image inside the canvas.
//!
//! The canvas has its own pixel dimensions; the uploaded image is scaled to fit
//! while keeping its aspect ratio and centered, leaving transparent bars on the
//! sides (pillarbox) or top and bottom (letterbox). All fill and text
//! coordinates are in canvas space.

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::buffer::PixelBuffer;

/// Where the image lands inside the canvas, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// Fit an `image_width` x `image_height` image into the canvas.
    pub fn fit(canvas_width: u32, canvas_height: u32, image_width: u32, image_height: u32) -> Self {
        if canvas_width == 0 || canvas_height == 0 || image_width == 0 || image_height == 0 {
            return Self {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
            };
        }

        let (cw, ch) = (canvas_width as f32, canvas_height as f32);
        let canvas_aspect = cw / ch;
        let image_aspect = image_width as f32 / image_height as f32;

        if canvas_aspect > image_aspect {
            // Canvas is wider than the image
            let width = ch * image_aspect;
            Self {
                x: (cw - width) / 2.0,
                y: 0.0,
                width,
                height: ch,
            }
        } else {
            let height = cw / image_aspect;
            Self {
                x: 0.0,
                y: (ch - height) / 2.0,
                width: cw,
                height,
            }
        }
    }
}

/// Draw `image` letterboxed into a new transparent canvas buffer.
pub fn render_letterboxed(image: &RgbaImage, canvas_width: u32, canvas_height: u32) -> PixelBuffer {
    let mut canvas = RgbaImage::new(canvas_width, canvas_height);
    let placement = Placement::fit(canvas_width, canvas_height, image.width(), image.height());

    let draw_w = placement.width.round() as u32;
    let draw_h = placement.height.round() as u32;
    if draw_w > 0 && draw_h > 0 {
        let scaled = if (draw_w, draw_h) == image.dimensions() {
            image.clone()
        } else {
            imageops::resize(image, draw_w, draw_h, FilterType::Triangle)
        };
        imageops::overlay(
            &mut canvas,
            &scaled,
            i64::from(placement.x.round() as u32),
            i64::from(placement.y.round() as u32),
        );
    }

    log::debug!(
        "Rendered {}x{} image into {}x{} canvas at ({:.1}, {:.1}) size {:.1}x{:.1}",
        image.width(),
        image.height(),
        canvas_width,
        canvas_height,
        placement.x,
        placement.y,
        placement.width,
        placement.height
    );
    PixelBuffer::from_rgba_image(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn test_pillarbox_for_wide_canvas() {
        let p = Placement::fit(200, 100, 100, 100);
        assert_eq!(p, Placement { x: 50.0, y: 0.0, width: 100.0, height: 100.0 });
    }

    #[test]
    fn test_letterbox_for_tall_canvas() {
        let p = Placement::fit(100, 200, 200, 100);
        assert_eq!(p, Placement { x: 0.0, y: 75.0, width: 100.0, height: 50.0 });
    }

    #[test]
    fn test_same_aspect_fills_canvas() {
        let p = Placement::fit(300, 150, 600, 300);
        assert_eq!(p, Placement { x: 0.0, y: 0.0, width: 300.0, height: 150.0 });
    }

    #[test]
    fn test_degenerate_sizes() {
        let p = Placement::fit(0, 100, 10, 10);
        assert_eq!(p.width, 0.0);
        assert_eq!(Placement::fit(10, 10, 0, 10).height, 0.0);
    }

    #[test]
    fn test_render_leaves_transparent_bars() {
        let source = RgbaImage::from_pixel(10, 10, image::Rgba([255, 255, 255, 255]));
        let canvas = render_letterboxed(&source, 20, 10);

        assert_eq!(canvas.dimensions(), (20, 10));
        assert_eq!(canvas.get(0, 5), Some(Rgba::TRANSPARENT));
        assert_eq!(canvas.get(19, 5), Some(Rgba::TRANSPARENT));
        assert_eq!(canvas.get(10, 5), Some(Rgba::WHITE));
        assert_eq!(canvas.count_color(Rgba::WHITE), 100);
    }
}
