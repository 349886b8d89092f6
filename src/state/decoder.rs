//! Background thread for image decoding.
//!
//! Uploading is fire-and-forget: bytes are handed to the decoder thread and the
//! result is picked up later on the editing thread. By then the user may have
//! removed the image, so results carry the image id and the receiver decides
//! whether they still apply.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use image::RgbaImage;

/// Successfully decoded upload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Id assigned at upload time
    pub id: String,
    /// Original file name
    pub name: String,
    /// Encoded bytes as uploaded
    pub source_bytes: Vec<u8>,
    /// Decoded pixels at the image's native size
    pub pixels: RgbaImage,
}

/// Failed decode of an upload.
#[derive(Debug, Clone)]
pub struct DecodeError {
    pub id: String,
    pub name: String,
    pub error: String,
}

/// Outcome of a decode request.
#[derive(Debug, Clone)]
pub enum DecodeResult {
    Decoded(DecodedImage),
    Error(DecodeError),
}

impl DecodeResult {
    pub fn id(&self) -> &str {
        match self {
            DecodeResult::Decoded(img) => &img.id,
            DecodeResult::Error(err) => &err.id,
        }
    }
}

/// Decode PNG/JPEG bytes into RGBA pixels.
pub fn decode_image(id: String, name: String, data: Vec<u8>) -> DecodeResult {
    log::debug!("Decoding image {} '{}' ({} bytes)", id, name, data.len());

    match image::load_from_memory(&data) {
        Ok(decoded) => {
            let pixels = decoded.to_rgba8();
            log::debug!(
                "Decoded '{}': {}x{}",
                name,
                pixels.width(),
                pixels.height()
            );
            DecodeResult::Decoded(DecodedImage {
                id,
                name,
                source_bytes: data,
                pixels,
            })
        }
        Err(e) => {
            log::debug!("Failed to decode '{}': {}", name, e);
            DecodeResult::Error(DecodeError {
                id,
                name,
                error: e.to_string(),
            })
        }
    }
}

struct DecodeRequest {
    id: String,
    name: String,
    data: Vec<u8>,
}

enum ThreadMessage {
    Decode(DecodeRequest),
    Shutdown,
}

/// Manages a background thread for image decoding.
pub struct DecoderThread {
    request_tx: Sender<ThreadMessage>,
    result_rx: Receiver<DecodeResult>,
    thread_handle: Option<JoinHandle<()>>,
    /// Ids of requests that have not produced a result yet
    pending_ids: HashSet<String>,
}

impl DecoderThread {
    /// Spawn a new decoder thread.
    pub fn spawn() -> Result<Self, String> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<DecodeResult>();

        let thread_handle = thread::Builder::new()
            .name("image-decoder".to_string())
            .spawn(move || {
                log::debug!("Image decoder thread started");
                Self::thread_loop(request_rx, result_tx);
                log::debug!("Image decoder thread exiting");
            })
            .map_err(|e| format!("Failed to spawn decoder thread: {}", e))?;

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            pending_ids: HashSet::new(),
        })
    }

    fn thread_loop(request_rx: Receiver<ThreadMessage>, result_tx: Sender<DecodeResult>) {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Decode(request)) => {
                    let result = decode_image(request.id, request.name, request.data);
                    if result_tx.send(result).is_err() {
                        log::warn!("Result channel closed, decoder thread exiting");
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) | Err(_) => break,
            }
        }
    }

    /// Queue bytes for decoding. Returns false if the thread is gone.
    pub fn request_decode(&mut self, id: String, name: String, data: Vec<u8>) -> bool {
        self.pending_ids.insert(id.clone());
        let request = DecodeRequest { id, name, data };
        if let Err(mpsc::SendError(message)) = self.request_tx.send(ThreadMessage::Decode(request)) {
            log::error!("Failed to send decode request: channel closed");
            if let ThreadMessage::Decode(request) = message {
                self.pending_ids.remove(&request.id);
            }
            return false;
        }
        true
    }

    fn settle(&mut self, result: DecodeResult) -> DecodeResult {
        self.pending_ids.remove(result.id());
        result
    }

    /// Take one completed result without blocking.
    pub fn take_one_result(&mut self) -> Option<DecodeResult> {
        match self.result_rx.try_recv() {
            Ok(result) => Some(self.settle(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Decoder thread disconnected");
                None
            }
        }
    }

    /// Block until a result arrives or `timeout` elapses.
    pub fn wait_one_result(&mut self, timeout: Duration) -> Option<DecodeResult> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Some(self.settle(result)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Decoder thread disconnected");
                None
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending_ids.len()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending_ids.contains(id)
    }
}

impl Drop for DecoderThread {
    fn drop(&mut self) {
        let _ = self.request_tx.send(ThreadMessage::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Decoder thread panicked: {:?}", e);
            }
        }
    }
}
