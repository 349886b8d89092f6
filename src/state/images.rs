//! Uploaded images and their per-image render data.

use planmark_raster::PixelBuffer;

/// An uploaded image. Immutable after creation.
#[derive(Clone, Debug)]
pub struct UploadedImage {
    /// Unique id, `image-<unix-millis>-<seq>`
    pub id: String,
    /// Original file name
    pub name: String,
    /// Decoded width in source pixels
    pub width: u32,
    /// Decoded height in source pixels
    pub height: u32,
    /// Encoded bytes as uploaded
    pub source_bytes: Vec<u8>,
}

/// An image ready for editing.
#[derive(Clone, Debug)]
pub struct ImageRecord {
    pub image: UploadedImage,
    /// The image rendered into the canvas before any edit
    pub pristine_frame: PixelBuffer,
}

/// Load state of an upload, shown in the image list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadState {
    /// Bytes handed to the decoder, no result yet
    Decoding,
    /// Decoded and available for editing
    Ready,
    /// Decoding failed; the message is kept for display
    Failed(String),
}

/// An upload that has not become an editable image.
#[derive(Clone, Debug)]
pub struct PendingUpload {
    pub id: String,
    pub name: String,
    pub state: UploadState,
}

/// Ordered list of images in the session, in upload order.
#[derive(Clone, Debug, Default)]
pub struct ImageStore {
    records: Vec<ImageRecord>,
    uploads: Vec<PendingUpload>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.image.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.image.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Register an upload whose decode is in flight.
    pub fn begin_upload(&mut self, id: String, name: String) {
        self.uploads.push(PendingUpload {
            id,
            name,
            state: UploadState::Decoding,
        });
    }

    pub fn upload_state(&self, id: &str) -> Option<UploadState> {
        if self.get(id).is_some() {
            return Some(UploadState::Ready);
        }
        self.uploads
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.state.clone())
    }

    pub fn is_decoding(&self, id: &str) -> bool {
        self.uploads
            .iter()
            .any(|u| u.id == id && u.state == UploadState::Decoding)
    }

    /// Uploads still decoding or that failed.
    pub fn uploads(&self) -> &[PendingUpload] {
        &self.uploads
    }

    /// Move a decoding upload into the ready list.
    /// Returns false if the upload is no longer expected.
    pub fn complete_upload(&mut self, record: ImageRecord) -> bool {
        if !self.is_decoding(&record.image.id) {
            return false;
        }
        self.uploads.retain(|u| u.id != record.image.id);
        self.records.push(record);
        true
    }

    /// Mark a decoding upload as failed. Returns false if it is no longer expected.
    pub fn fail_upload(&mut self, id: &str, message: String) -> bool {
        match self
            .uploads
            .iter_mut()
            .find(|u| u.id == id && u.state == UploadState::Decoding)
        {
            Some(upload) => {
                upload.state = UploadState::Failed(message);
                true
            }
            None => false,
        }
    }

    /// Remove an image or upload. Returns the index the ready image had.
    pub fn remove(&mut self, id: &str) -> Option<usize> {
        self.uploads.retain(|u| u.id != id);
        let index = self.index_of(id)?;
        self.records.remove(index);
        Some(index)
    }
}
