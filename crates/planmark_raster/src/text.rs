//! Text measurement and rasterization.
//!
//! Hit-testing needs a text width, and export needs actual glyph pixels. Both
//! go through [`TextMeasure`], so the editing engine can run with the cheap
//! [`EstimatedMetrics`] while export uses a real font via [`GlyphFont`].

use ab_glyph::{Font, FontArc, FontVec, GlyphId, ScaleFont, point};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};

use crate::buffer::PixelBuffer;
use crate::color::Rgba;
use crate::error::{RasterError, Result};

/// Font size and weight of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    /// Font size in pixels
    pub size: u32,
    pub bold: bool,
}

impl TextStyle {
    pub fn new(size: u32, bold: bool) -> Self {
        Self { size, bold }
    }
}

/// Measures rendered text.
pub trait TextMeasure {
    /// Width and height of a single line of `text`. Height is the font size.
    fn measure(&self, text: &str, style: TextStyle) -> (f32, f32);
}

/// Font-free estimate based on an average character width.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedMetrics {
    /// Average character width as a ratio of font size (0.5-0.6 for proportional fonts)
    pub char_width_ratio: f32,
    /// Extra width applied to bold text
    pub bold_width_factor: f32,
}

impl EstimatedMetrics {
    /// Ratios tuned for a typical sans-serif UI font such as Arial.
    pub const SANS: EstimatedMetrics = EstimatedMetrics {
        char_width_ratio: 0.55,
        bold_width_factor: 1.1,
    };

    /// Estimate the width of a single line of text.
    pub fn line_width(&self, text: &str, style: TextStyle) -> f32 {
        let char_count = text.chars().count() as f32;
        let width = char_count * style.size as f32 * self.char_width_ratio;
        if style.bold {
            width * self.bold_width_factor
        } else {
            width
        }
    }
}

impl Default for EstimatedMetrics {
    fn default() -> Self {
        Self::SANS
    }
}

impl TextMeasure for EstimatedMetrics {
    fn measure(&self, text: &str, style: TextStyle) -> (f32, f32) {
        (self.line_width(text, style), style.size as f32)
    }
}

/// A loaded font used to measure and rasterize text.
#[derive(Clone)]
pub struct GlyphFont {
    font: FontArc,
}

impl std::fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFont").finish_non_exhaustive()
    }
}

impl GlyphFont {
    /// Load a TrueType/OpenType font from its file bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| RasterError::InvalidFont(e.to_string()))?;
        Ok(Self { font })
    }

    /// Find a regular sans-serif face among the installed system fonts.
    ///
    /// Tries the generic sans family, then common sans families by name, then
    /// any face at all. Returns `None` when no usable font is installed.
    pub fn system_sans() -> Option<Self> {
        let mut db = Database::new();
        db.load_system_fonts();

        let families = [
            Family::SansSerif,
            Family::Name("DejaVu Sans"),
            Family::Name("Liberation Sans"),
            Family::Name("Noto Sans"),
            Family::Name("Arial"),
            Family::Name("Helvetica"),
        ];
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db.query(&query).or_else(|| db.faces().next().map(|face| face.id))?;

        let font = db
            .with_face_data(id, |data, index| {
                FontVec::try_from_vec_and_index(data.to_vec(), index).ok()
            })
            .flatten()?;
        log::debug!("Using system font face {:?}", id);
        Some(Self {
            font: FontArc::new(font),
        })
    }

    /// Pixel offset applied for faux bold; the font has a single weight.
    fn bold_offset(style: TextStyle) -> u32 {
        if style.bold { (style.size / 24).max(1) } else { 0 }
    }

    /// Glyph ids with their x offset from the line start, plus the total advance.
    fn layout(&self, text: &str, size: f32) -> (Vec<(GlyphId, f32)>, f32) {
        let scaled = self.font.as_scaled(size);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut cursor_x = 0.0f32;
        let mut last: Option<GlyphId> = None;

        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = last {
                cursor_x += scaled.kern(prev, id);
            }
            glyphs.push((id, cursor_x));
            cursor_x += scaled.h_advance(id);
            last = Some(id);
        }
        (glyphs, cursor_x)
    }

    /// Rasterize `text` with its baseline starting at (`x`, `y`) into `target`.
    ///
    /// Pixels outside the target are clipped.
    pub fn draw(&self, target: &mut PixelBuffer, text: &str, x: f32, y: f32, style: TextStyle, color: Rgba) {
        let size = style.size as f32;
        let (glyphs, _) = self.layout(text, size);
        let bold = Self::bold_offset(style);

        for (id, gx) in glyphs {
            let glyph = id.with_scale_and_position(size, point(x + gx, y));
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let cx = bounds.min.x as i64 + i64::from(px);
                let cy = bounds.min.y as i64 + i64::from(py);
                for dx in 0..=i64::from(bold) {
                    if target.contains(cx + dx, cy) {
                        target.blend((cx + dx) as u32, cy as u32, color, coverage);
                    }
                }
            });
        }
    }
}

impl TextMeasure for GlyphFont {
    fn measure(&self, text: &str, style: TextStyle) -> (f32, f32) {
        let (_, width) = self.layout(text, style.size as f32);
        (width + Self::bold_offset(style) as f32, style.size as f32)
    }
}
