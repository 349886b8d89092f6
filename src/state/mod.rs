//! Session state: uploaded images and background decoding.

pub mod decoder;
mod images;

pub use decoder::{DecodeError, DecodeResult, DecodedImage, DecoderThread, decode_image};
pub use images::{ImageRecord, ImageStore, PendingUpload, UploadState, UploadedImage};
