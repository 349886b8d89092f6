//! Connected-region flood fill.
//!
//! Breadth-first over 4-connected neighbors with an explicit queue, so
//! multi-megapixel floor plans cannot overflow the stack. Similarity is always
//! measured against the seed's original color; comparing against the previous
//! pixel would let the region drift across gradients.

use std::collections::VecDeque;

use crate::buffer::PixelBuffer;
use crate::color::Rgba;

/// Return every pixel reachable from the seed through 4-connected steps whose
/// RGB channels are each within `tolerance` of the seed color.
///
/// The buffer is not modified. A seed outside the buffer yields an empty list.
pub fn flood_fill(buffer: &PixelBuffer, seed_x: i64, seed_y: i64, tolerance: u8) -> Vec<(u32, u32)> {
    if !buffer.contains(seed_x, seed_y) {
        return Vec::new();
    }
    let (seed_x, seed_y) = (seed_x as u32, seed_y as u32);
    let Some(seed_color) = buffer.get(seed_x, seed_y) else {
        return Vec::new();
    };

    let (width, height) = buffer.dimensions();
    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;

    let mut visited = vec![false; width as usize * height as usize];
    let mut queue = VecDeque::new();
    let mut region = Vec::new();

    visited[index(seed_x, seed_y)] = true;
    queue.push_back((seed_x, seed_y));

    while let Some((x, y)) = queue.pop_front() {
        let matches = buffer
            .get(x, y)
            .is_some_and(|c| c.rgb_within(&seed_color, tolerance));
        if !matches {
            // Boundary pixel: visited, but the fill does not leak through it.
            continue;
        }
        region.push((x, y));

        let neighbors = [
            (x.checked_add(1), Some(y)),
            (x.checked_sub(1), Some(y)),
            (Some(x), y.checked_add(1)),
            (Some(x), y.checked_sub(1)),
        ];
        for (nx, ny) in neighbors {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            if nx >= width || ny >= height {
                continue;
            }
            let i = index(nx, ny);
            if !visited[i] {
                visited[i] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    log::trace!(
        "Flood fill from ({}, {}) tolerance {}: {} pixels",
        seed_x,
        seed_y,
        tolerance,
        region.len()
    );
    region
}

/// Write `color` (forced opaque) to each listed pixel.
///
/// Opaque output makes a fill of the transparent letterbox margin visible in
/// the export instead of keeping its zero alpha.
/// Out-of-bounds coordinates are skipped. Returns the number of pixels written.
pub fn apply_fill(buffer: &mut PixelBuffer, pixels: &[(u32, u32)], color: Rgba) -> usize {
    let color = color.opaque();
    pixels
        .iter()
        .filter(|&&(x, y)| buffer.put(x, y, color))
        .count()
}
