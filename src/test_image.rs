//! Synthetic floor plans for tests.

use std::io::Cursor;

use image::{Rgba, RgbaImage};

/// Solid white image encoded as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])))
}

/// White plan with a black outer wall and a vertical wall at `width / 2`,
/// giving two closed rooms.
pub fn two_room_plan(width: u32, height: u32) -> RgbaImage {
    let wall = Rgba([0, 0, 0, 255]);
    RgbaImage::from_fn(width, height, |x, y| {
        let on_outer = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
        if on_outer || x == width / 2 {
            wall
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encoding an in-memory PNG cannot fail");
    out.into_inner()
}
