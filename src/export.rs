//! Flatten the live canvas and its text labels into a PNG.

use std::io::Cursor;

use planmark_raster::{GlyphFont, PixelBuffer, Rgba};

use crate::error::SessionError;
use crate::model::TextElement;
use crate::session::Session;

/// Color of a text element, falling back to black when its hex is invalid.
pub fn text_color(element: &TextElement) -> Rgba {
    match Rgba::from_hex(&element.color) {
        Ok(color) => color,
        Err(e) => {
            log::warn!(
                "Text {} has invalid color '{}' ({}), exporting as black",
                element.id,
                element.color,
                e
            );
            Rgba::BLACK
        }
    }
}

/// Rasterize text elements onto a transparent layer of the given size.
pub fn render_text_layer(
    width: u32,
    height: u32,
    elements: &[TextElement],
    font: &GlyphFont,
) -> PixelBuffer {
    let mut layer = PixelBuffer::new(width, height);
    for element in elements {
        font.draw(
            &mut layer,
            &element.text,
            element.x,
            element.y,
            element.style(),
            text_color(element),
        );
    }
    layer
}

/// The active image's canvas with its text drawn on top.
///
/// Without an explicit font an installed sans-serif system font is used. If
/// none can be found while labels exist the export fails rather than dropping
/// them.
pub fn render_composite(
    session: &Session,
    font: Option<&GlyphFont>,
) -> Result<PixelBuffer, SessionError> {
    let base = session.pixels().ok_or(SessionError::NoImage)?;
    let elements = session.text_elements();
    if elements.is_empty() {
        return Ok(base.clone());
    }

    let system_font;
    let font = match font {
        Some(font) => font,
        None => {
            system_font = GlyphFont::system_sans().ok_or(SessionError::FontUnavailable {
                labels: elements.len(),
            })?;
            log::debug!("No font given, drawing labels with a system font");
            &system_font
        }
    };

    let layer = render_text_layer(base.width(), base.height(), elements, font);
    Ok(base.composite(&layer)?)
}

/// Encode a buffer as PNG bytes.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, SessionError> {
    let mut out = Cursor::new(Vec::new());
    buffer
        .to_rgba_image()
        .write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Export the active image as PNG bytes at canvas size.
pub fn export_png(session: &Session, font: Option<&GlyphFont>) -> Result<Vec<u8>, SessionError> {
    let composite = render_composite(session, font)?;
    let bytes = encode_png(&composite)?;
    log::info!(
        "Exported {}x{} PNG ({} bytes)",
        composite.width(),
        composite.height(),
        bytes.len()
    );
    Ok(bytes)
}
