//! Error types for editing sessions.

use planmark_raster::RasterError;
use thiserror::Error;

/// Errors surfaced by session operations that can legitimately fail.
///
/// Expected edge cases (missing ids, blank text, empty fills) are not errors;
/// those operations simply do nothing.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Image bytes could not be decoded
    #[error("Failed to decode '{name}': {message}")]
    Decode {
        /// Name of the uploaded file
        name: String,
        /// Decoder error message
        message: String,
    },

    /// Invariant violation in pixel data
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    /// PNG encoding failed during export
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    /// No image is selected
    #[error("No image selected")]
    NoImage,

    /// Text labels exist but no font is available to draw them
    #[error("No font available to draw {labels} text labels")]
    FontUnavailable {
        /// Number of labels that would be lost
        labels: usize,
    },

    /// The background decoder thread could not be started
    #[error("Decoder unavailable: {0}")]
    DecoderUnavailable(String),
}
