//! Editing session: the active image, the live canvas and pointer dispatch.
//!
//! The session owns every uploaded image, one history per image and the
//! working copies (pixels and text list) of whichever image is selected.
//! Pointer input is routed by the selected tool and the current
//! [`PointerPhase`]; every completed edit is captured into the image's history.

use std::time::Duration;

use planmark_raster::{
    EstimatedMetrics, PixelBuffer, RasterError, Rgba, TextMeasure, apply_fill, flood_fill,
    render_letterboxed,
};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::config::{EditorConfig, EditorPreferences};
use crate::error::SessionError;
use crate::history::{EditHistory, HistoryConfig, HistoryEntry};
use crate::keybindings::{KeyBindings, Modifiers, Shortcut};
use crate::model::{EditorState, TextElement, TextId, TextPatch, TextStore, Tool};
use crate::state::{
    DecodeResult, DecodedImage, DecoderThread, ImageRecord, ImageStore, UploadedImage,
    decode_image,
};

// ============================================================================
// Configuration
// ============================================================================

/// Canvas and history settings for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub history: HistoryConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&EditorPreferences::default())
    }
}

impl From<&EditorPreferences> for SessionConfig {
    fn from(prefs: &EditorPreferences) -> Self {
        Self {
            canvas_width: prefs.canvas_width,
            canvas_height: prefs.canvas_height,
            history: prefs.history_config(),
        }
    }
}

// ============================================================================
// Pointer State Machine
// ============================================================================

/// Text being typed before it is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct TextInput {
    /// Baseline origin of the text
    pub x: f32,
    pub y: f32,
    /// Current input content
    pub text: String,
    /// Element being edited in place, or `None` when creating a new one
    pub editing: Option<TextId>,
}

/// What the pointer is currently doing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PointerPhase {
    #[default]
    Idle,
    /// Dragging a text element. The offset keeps the grab point under the pointer.
    Dragging {
        id: TextId,
        offset_x: f32,
        offset_y: f32,
    },
    /// A text input is open
    TextInput(TextInput),
}

/// Result of a pointer press.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Nothing happened
    Ignored,
    /// A region was recolored
    Filled { pixels: usize },
    /// A text input opened, pre-filled when editing an existing element
    TextInputOpened { editing: Option<TextId> },
    /// A drag started on a text element
    DragStarted(TextId),
}

/// Kind of edit a history capture records, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Fill,
    AddText,
    EditText,
    MoveText,
    DeleteText,
    /// Live state flushed before switching images
    Flush,
}

impl EditKind {
    pub fn description(&self) -> &'static str {
        match self {
            EditKind::Fill => "Fill",
            EditKind::AddText => "Add text",
            EditKind::EditText => "Edit text",
            EditKind::MoveText => "Move text",
            EditKind::DeleteText => "Delete text",
            EditKind::Flush => "Switch image",
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// A single-user editing session over a set of uploaded images.
pub struct Session {
    config: SessionConfig,
    state: EditorState,
    keybindings: KeyBindings,
    images: ImageStore,
    history: EditHistory,
    /// Id of the selected image
    current: Option<String>,
    /// Live canvas of the selected image
    pixels: Option<PixelBuffer>,
    /// Live text list of the selected image
    texts: TextStore,
    phase: PointerPhase,
    measure: Box<dyn TextMeasure>,
    decoder: Option<DecoderThread>,
    upload_seq: u64,
}

impl Session {
    /// Create a session that decodes uploads synchronously.
    pub fn new(config: SessionConfig) -> Self {
        let history = EditHistory::new(config.history.clone());
        Self {
            config,
            state: EditorState::default(),
            keybindings: KeyBindings::default(),
            images: ImageStore::new(),
            history,
            current: None,
            pixels: None,
            texts: TextStore::new(),
            phase: PointerPhase::Idle,
            measure: Box::new(EstimatedMetrics::default()),
            decoder: None,
            upload_seq: 0,
        }
    }

    /// Create a session from a loaded configuration.
    pub fn from_config(config: &EditorConfig) -> Self {
        let mut session = Self::new(SessionConfig::from(&config.preferences));
        session.state = config.preferences.editor_state();
        session.keybindings = config.keybindings.to_keybindings();
        session
    }

    /// Use `measure` for hit-testing text.
    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    /// Decode uploads on a background thread.
    ///
    /// Results must then be collected with [`Session::poll_decoded`] or
    /// [`Session::wait_for_decodes`].
    pub fn with_background_decoder(mut self) -> Result<Self, SessionError> {
        let decoder = DecoderThread::spawn().map_err(SessionError::DecoderUnavailable)?;
        self.decoder = Some(decoder);
        Ok(self)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn current_image_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_image(&self) -> Option<&ImageRecord> {
        self.current.as_deref().and_then(|id| self.images.get(id))
    }

    /// Live canvas of the selected image.
    pub fn pixels(&self) -> Option<&PixelBuffer> {
        self.pixels.as_ref()
    }

    /// Live text elements of the selected image.
    pub fn text_elements(&self) -> &[TextElement] {
        self.texts.elements()
    }

    pub fn phase(&self) -> &PointerPhase {
        &self.phase
    }

    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    // ------------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------------

    fn next_image_id(&mut self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        self.upload_seq += 1;
        format!("image-{}-{}", millis, self.upload_seq)
    }

    /// Add an image from encoded PNG/JPEG bytes and return its id.
    ///
    /// Without a background decoder the image is decoded before this returns.
    /// The first image to finish decoding is selected if none is.
    pub fn upload(&mut self, name: &str, bytes: Vec<u8>) -> String {
        let id = self.next_image_id();
        self.images.begin_upload(id.clone(), name.to_string());

        match self.decoder.as_mut() {
            Some(decoder) => {
                if !decoder.request_decode(id.clone(), name.to_string(), bytes) {
                    self.images
                        .fail_upload(&id, "decoder thread unavailable".to_string());
                }
            }
            None => {
                let result = decode_image(id.clone(), name.to_string(), bytes);
                self.complete_decode(result);
            }
        }
        id
    }

    /// Apply a decode result. Results for removed images are dropped.
    pub fn complete_decode(&mut self, result: DecodeResult) -> bool {
        if !self.images.is_decoding(result.id()) {
            log::debug!("Dropping decode result for removed image {}", result.id());
            return false;
        }

        match result {
            DecodeResult::Decoded(decoded) => {
                self.add_decoded(decoded);
                true
            }
            DecodeResult::Error(err) => {
                let error = SessionError::Decode {
                    name: err.name,
                    message: err.error,
                };
                log::warn!("{}", error);
                self.images.fail_upload(&err.id, error.to_string());
                true
            }
        }
    }

    fn add_decoded(&mut self, decoded: DecodedImage) {
        let frame = render_letterboxed(
            &decoded.pixels,
            self.config.canvas_width,
            self.config.canvas_height,
        );
        let image = UploadedImage {
            id: decoded.id,
            name: decoded.name,
            width: decoded.pixels.width(),
            height: decoded.pixels.height(),
            source_bytes: decoded.source_bytes,
        };
        let id = image.id.clone();
        log::info!(
            "Added image '{}' ({}x{}) as {}",
            image.name,
            image.width,
            image.height,
            id
        );

        self.history.initialize(&id, Vec::new());
        self.history.backfill_initial_snapshot(&id, frame.clone());
        self.images.complete_upload(ImageRecord {
            image,
            pristine_frame: frame,
        });

        if self.current.is_none() {
            self.select_image(&id);
        }
    }

    /// Apply every decode result that is ready, without blocking.
    pub fn poll_decoded(&mut self) -> usize {
        let mut results = Vec::new();
        if let Some(decoder) = self.decoder.as_mut() {
            while let Some(result) = decoder.take_one_result() {
                results.push(result);
            }
        }
        let mut applied = 0;
        for result in results {
            if self.complete_decode(result) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until every queued upload has been decoded or `timeout` passes
    /// without a result. Returns the number of results applied.
    pub fn wait_for_decodes(&mut self, timeout: Duration) -> usize {
        let mut applied = 0;
        loop {
            let result = match self.decoder.as_mut() {
                Some(decoder) if decoder.pending_count() > 0 => decoder.wait_one_result(timeout),
                _ => break,
            };
            match result {
                Some(result) => {
                    if self.complete_decode(result) {
                        applied += 1;
                    }
                }
                None => {
                    log::warn!("Timed out waiting for image decoding");
                    break;
                }
            }
        }
        applied
    }

    // ------------------------------------------------------------------------
    // Image Selection
    // ------------------------------------------------------------------------

    /// Make `id` the active image.
    ///
    /// The outgoing image's live state is captured first. Returns false if the
    /// image is unknown or not decoded.
    pub fn select_image(&mut self, id: &str) -> bool {
        if self.images.get(id).is_none() {
            log::debug!("Ignoring selection of unknown image {}", id);
            return false;
        }
        if self.current.as_deref() == Some(id) {
            return true;
        }

        self.settle_phase();
        self.capture(EditKind::Flush);

        if !self.history.contains(id) {
            self.history.initialize(id, Vec::new());
        }
        self.current = Some(id.to_string());
        if let Some(entry) = self.history.current(id).cloned() {
            self.restore(&entry);
        }
        log::debug!("Selected image {}", id);
        true
    }

    /// Remove an image and its history.
    ///
    /// If it was selected, its neighbor (the next image, else the previous)
    /// becomes active.
    pub fn remove_image(&mut self, id: &str) -> bool {
        let was_current = self.current.as_deref() == Some(id);
        let known = self.images.upload_state(id).is_some();
        let removed_index = self.images.remove(id);
        let had_history = self.history.remove(id);
        if !known && !had_history {
            return false;
        }
        log::info!("Removed image {}", id);

        if was_current {
            self.current = None;
            self.pixels = None;
            self.texts.replace_all(Vec::new());
            self.phase = PointerPhase::Idle;

            let records = self.images.records();
            let neighbor = removed_index.and_then(|index| {
                records
                    .get(index)
                    .or_else(|| index.checked_sub(1).and_then(|i| records.get(i)))
                    .map(|r| r.image.id.clone())
            });
            if let Some(next) = neighbor {
                self.select_image(&next);
            }
        }
        true
    }

    /// Load a history entry into the working copies.
    fn restore(&mut self, entry: &HistoryEntry) {
        self.texts.replace_all(entry.text_elements.clone());
        self.pixels = match &entry.pixels {
            Some(pixels) => Some(pixels.clone()),
            None => self.current_image().map(|r| r.pristine_frame.clone()),
        };
        self.state.text_size = entry.text_size;
        self.state.bold = entry.bold;
    }

    /// Capture the live state of the active image.
    fn capture(&mut self, kind: EditKind) -> bool {
        let Some(id) = self.current.as_deref() else {
            return false;
        };
        let entry = HistoryEntry {
            text_elements: self.texts.elements().to_vec(),
            pixels: self.pixels.clone(),
            text_size: self.state.text_size,
            bold: self.state.bold,
        };
        let captured = self.history.capture_if_changed(id, entry);
        if captured {
            log::debug!("📝 {} on {}", kind.description(), id);
        }
        captured
    }

    // ------------------------------------------------------------------------
    // Editor State
    // ------------------------------------------------------------------------

    pub fn set_tool(&mut self, tool: Tool) {
        if self.state.tool != tool {
            self.settle_phase();
            log::debug!("Tool: {}", tool.name());
            self.state.tool = tool;
        }
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.state.color = color;
    }

    /// Select a color given as hex, e.g. `#90EE90`.
    pub fn set_color_hex(&mut self, hex: &str) -> Result<(), RasterError> {
        self.state.color = Rgba::from_hex(hex)?;
        Ok(())
    }

    pub fn set_text_size(&mut self, size: u32) {
        self.state.text_size = size.max(1);
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.state.bold = bold;
    }

    pub fn set_fill_tolerance(&mut self, tolerance: u8) {
        self.state.fill_tolerance = tolerance;
    }

    // ------------------------------------------------------------------------
    // Pointer Input
    // ------------------------------------------------------------------------

    /// Finish whatever the pointer was doing: open text is committed and a
    /// drag in progress is ended.
    fn settle_phase(&mut self) {
        match self.phase {
            PointerPhase::TextInput(_) => {
                self.commit_text();
            }
            PointerPhase::Dragging { .. } => {
                self.pointer_up();
            }
            PointerPhase::Idle => {}
        }
    }

    /// Handle a pointer press at canvas coordinates.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> PointerOutcome {
        if self.current.is_none() {
            return PointerOutcome::Ignored;
        }
        self.settle_phase();
        let (x, y) = (x.floor(), y.floor());

        match self.state.tool {
            Tool::Fill => self.fill_at(x, y),
            Tool::Text => {
                let editing = self.texts.hit_test(x, y, self.measure.as_ref()).cloned();
                let input = match editing {
                    Some(el) => TextInput {
                        x: el.x,
                        y: el.y,
                        text: el.text,
                        editing: Some(el.id),
                    },
                    None => TextInput {
                        x,
                        y,
                        text: String::new(),
                        editing: None,
                    },
                };
                let editing = input.editing;
                self.phase = PointerPhase::TextInput(input);
                PointerOutcome::TextInputOpened { editing }
            }
            Tool::Pointer => match self.texts.hit_test(x, y, self.measure.as_ref()) {
                Some(el) => {
                    let id = el.id;
                    self.phase = PointerPhase::Dragging {
                        id,
                        offset_x: el.x - x,
                        offset_y: el.y - y,
                    };
                    log::debug!("Dragging text {}", id);
                    PointerOutcome::DragStarted(id)
                }
                None => PointerOutcome::Ignored,
            },
        }
    }

    fn fill_at(&mut self, x: f32, y: f32) -> PointerOutcome {
        let Some(pixels) = self.pixels.as_mut() else {
            return PointerOutcome::Ignored;
        };
        let region = flood_fill(pixels, x as i64, y as i64, self.state.fill_tolerance);
        if region.is_empty() {
            return PointerOutcome::Ignored;
        }
        let written = apply_fill(pixels, &region, self.state.color);
        log::debug!(
            "Filled {} pixels at ({}, {}) with {}",
            written,
            x,
            y,
            self.state.color
        );
        self.capture(EditKind::Fill);
        PointerOutcome::Filled { pixels: written }
    }

    /// Handle pointer movement. Moves the dragged element without capturing.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        match self.phase {
            PointerPhase::Dragging {
                id,
                offset_x,
                offset_y,
            } => {
                let (x, y) = (x.floor(), y.floor());
                self.texts.move_to(id, x + offset_x, y + offset_y)
            }
            _ => false,
        }
    }

    /// Handle pointer release or the pointer leaving the canvas.
    ///
    /// Ends a drag and captures the moved position once.
    pub fn pointer_up(&mut self) -> bool {
        if let PointerPhase::Dragging { .. } = self.phase {
            self.phase = PointerPhase::Idle;
            return self.capture(EditKind::MoveText);
        }
        false
    }

    // ------------------------------------------------------------------------
    // Text Input
    // ------------------------------------------------------------------------

    /// Replace the content of the open text input.
    pub fn set_text_input(&mut self, text: &str) -> bool {
        match &mut self.phase {
            PointerPhase::TextInput(input) => {
                input.text = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Commit the open text input.
    ///
    /// Creates a new element or rewrites the edited one with the input and the
    /// selected color. Blank input closes the input without change.
    pub fn commit_text(&mut self) -> Option<TextId> {
        if !matches!(self.phase, PointerPhase::TextInput(_)) {
            return None;
        }
        let PointerPhase::TextInput(input) = std::mem::take(&mut self.phase) else {
            return None;
        };
        if input.text.trim().is_empty() {
            log::debug!("Discarding blank text input");
            return None;
        }

        let color = self.state.color.to_hex();
        match input.editing {
            Some(id) => {
                if !self.texts.update(id, &TextPatch::content(input.text, color)) {
                    return None;
                }
                self.capture(EditKind::EditText);
                Some(id)
            }
            None => {
                let id = self.texts.add(
                    input.x,
                    input.y,
                    &input.text,
                    &color,
                    self.state.text_size,
                    self.state.bold,
                )?;
                self.capture(EditKind::AddText);
                Some(id)
            }
        }
    }

    /// Close the open text input without change.
    pub fn cancel_text(&mut self) {
        if let PointerPhase::TextInput(_) = self.phase {
            self.phase = PointerPhase::Idle;
        }
    }

    /// Delete a text element from the active image.
    pub fn delete_text(&mut self, id: TextId) -> bool {
        if !self.texts.delete(id) {
            return false;
        }
        if matches!(self.phase, PointerPhase::Dragging { id: dragged, .. } if dragged == id) {
            self.phase = PointerPhase::Idle;
        }
        self.capture(EditKind::DeleteText);
        true
    }

    // ------------------------------------------------------------------------
    // Undo / Redo
    // ------------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.current
            .as_deref()
            .is_some_and(|id| self.history.can_undo(id))
    }

    pub fn can_redo(&self) -> bool {
        self.current
            .as_deref()
            .is_some_and(|id| self.history.can_redo(id))
    }

    /// Step the active image back one entry. Never captures.
    pub fn undo(&mut self) -> bool {
        let Some(id) = self.current.clone() else {
            return false;
        };
        match self.history.undo(&id).cloned() {
            Some(entry) => {
                self.phase = PointerPhase::Idle;
                self.restore(&entry);
                true
            }
            None => false,
        }
    }

    /// Step the active image forward one entry. Never captures.
    pub fn redo(&mut self) -> bool {
        let Some(id) = self.current.clone() else {
            return false;
        };
        match self.history.redo(&id).cloned() {
            Some(entry) => {
                self.phase = PointerPhase::Idle;
                self.restore(&entry);
                true
            }
            None => false,
        }
    }

    /// Handle a key press: history shortcuts, then tool hotkeys.
    ///
    /// Tool hotkeys are ignored while a text input is open so they can be typed.
    pub fn handle_key(&mut self, key: char, modifiers: Modifiers) -> bool {
        if let Some(shortcut) = self.keybindings.shortcut_for(key, modifiers) {
            return match shortcut {
                Shortcut::Undo => self.undo(),
                Shortcut::Redo => self.redo(),
            };
        }
        if matches!(self.phase, PointerPhase::TextInput(_)) {
            return false;
        }
        match self.keybindings.tool_for_key(key, modifiers) {
            Some(tool) => {
                self.set_tool(tool);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_image::{encode_png, png_bytes, two_room_plan};

    const BLUE: Rgba = Rgba::rgb(0xAD, 0xD8, 0xE6);
    const GREEN: Rgba = Rgba::rgb(0x90, 0xEE, 0x90);

    fn session(width: u32, height: u32) -> Session {
        Session::new(SessionConfig {
            canvas_width: width,
            canvas_height: height,
            history: HistoryConfig::default(),
        })
    }

    fn white_session() -> (Session, String) {
        let mut s = session(100, 100);
        let id = s.upload("plan.png", png_bytes(100, 100));
        (s, id)
    }

    fn cursor(s: &Session) -> usize {
        s.history()
            .get(s.current_image_id().unwrap())
            .unwrap()
            .cursor()
    }

    fn entries(s: &Session) -> usize {
        s.history()
            .get(s.current_image_id().unwrap())
            .unwrap()
            .len()
    }

    #[test]
    fn test_first_upload_is_selected_and_backfilled() {
        let (s, id) = white_session();
        assert!(id.starts_with("image-"));
        assert_eq!(s.current_image_id(), Some(id.as_str()));
        assert_eq!(s.pixels().unwrap().dimensions(), (100, 100));

        let history = s.history().get(&id).unwrap();
        assert_eq!(history.len(), 1);
        assert!(history.current().pixels.is_some());
        assert!(!s.can_undo());
    }

    #[test]
    fn test_white_fill_undo_redo() {
        let (mut s, _) = white_session();

        let outcome = s.pointer_down(50.0, 50.0);
        assert_eq!(outcome, PointerOutcome::Filled { pixels: 10_000 });
        assert_eq!(s.pixels().unwrap().count_color(BLUE), 10_000);
        assert_eq!(entries(&s), 2);
        assert_eq!(cursor(&s), 1);

        assert!(s.undo());
        assert_eq!(s.pixels().unwrap().count_color(Rgba::WHITE), 10_000);
        assert!(s.can_redo());

        assert!(s.redo());
        assert_eq!(s.pixels().unwrap().count_color(BLUE), 10_000);
        assert_eq!(cursor(&s), 1);
        assert!(!s.can_redo());
    }

    #[test]
    fn test_fill_stays_inside_room() {
        let mut s = session(40, 20);
        s.upload("rooms.png", encode_png(&two_room_plan(40, 20)));
        s.set_color(GREEN);

        assert!(matches!(
            s.pointer_down(5.0, 5.0),
            PointerOutcome::Filled { .. }
        ));
        let pixels = s.pixels().unwrap();
        assert_eq!(pixels.get(5, 5), Some(GREEN));
        assert_eq!(pixels.get(30, 5), Some(Rgba::WHITE));
        assert_eq!(pixels.get(20, 5), Some(Rgba::BLACK));
    }

    #[test]
    fn test_repeat_fill_does_not_capture() {
        let (mut s, _) = white_session();
        s.pointer_down(10.0, 10.0);
        assert_eq!(entries(&s), 2);

        // Same region, same color: pixels unchanged
        s.pointer_down(20.0, 20.0);
        assert_eq!(entries(&s), 2);
        assert_eq!(cursor(&s), 1);
    }

    #[test]
    fn test_fill_outside_canvas_is_ignored() {
        let (mut s, _) = white_session();
        assert_eq!(s.pointer_down(-3.0, 5.0), PointerOutcome::Ignored);
        assert_eq!(s.pointer_down(500.0, 5.0), PointerOutcome::Ignored);
        assert_eq!(entries(&s), 1);
    }

    #[test]
    fn test_edit_after_undo_truncates_redo() {
        let (mut s, _) = white_session();
        s.pointer_down(1.0, 1.0);
        s.set_color(GREEN);
        s.pointer_down(1.0, 1.0);
        assert_eq!(entries(&s), 3);

        s.undo();
        s.undo();
        assert_eq!(cursor(&s), 0);

        s.set_color(Rgba::BLACK);
        s.pointer_down(1.0, 1.0);
        assert_eq!(entries(&s), 2);
        assert_eq!(cursor(&s), 1);
        assert!(!s.can_redo());
    }

    #[test]
    fn test_add_text_and_hit_test() {
        let (mut s, _) = white_session();
        s.set_tool(Tool::Text);

        assert_eq!(
            s.pointer_down(10.0, 10.0),
            PointerOutcome::TextInputOpened { editing: None }
        );
        assert!(s.set_text_input("Room A"));
        let id = s.commit_text().unwrap();

        let el = &s.text_elements()[0];
        assert_eq!(el.id, id);
        assert_eq!((el.x, el.y), (10.0, 10.0));
        assert_eq!(el.color, "#ADD8E6");
        assert_eq!(el.size, 16);
        assert_eq!(entries(&s), 2);
        assert_eq!(s.phase(), &PointerPhase::Idle);

        // Clicking the label opens it for editing
        assert_eq!(
            s.pointer_down(10.0, 8.0),
            PointerOutcome::TextInputOpened { editing: Some(id) }
        );
        s.cancel_text();
        assert_eq!(
            s.pointer_down(200.0, 200.0),
            PointerOutcome::TextInputOpened { editing: None }
        );
    }

    #[test]
    fn test_blank_text_is_discarded() {
        let (mut s, _) = white_session();
        s.set_tool(Tool::Text);
        s.pointer_down(10.0, 10.0);
        s.set_text_input("   ");
        assert_eq!(s.commit_text(), None);
        assert!(s.text_elements().is_empty());
        assert_eq!(entries(&s), 1);
        assert_eq!(s.phase(), &PointerPhase::Idle);
    }

    #[test]
    fn test_edit_text_in_place_uses_current_color() {
        let (mut s, _) = white_session();
        s.set_tool(Tool::Text);
        s.pointer_down(10.0, 30.0);
        s.set_text_input("Kitchen");
        let id = s.commit_text().unwrap();

        s.set_color(GREEN);
        s.pointer_down(12.0, 25.0);
        match s.phase() {
            PointerPhase::TextInput(input) => assert_eq!(input.text, "Kitchen"),
            other => panic!("expected text input, got {:?}", other),
        }
        s.set_text_input("Pantry");
        assert_eq!(s.commit_text(), Some(id));

        let el = &s.text_elements()[0];
        assert_eq!(el.text, "Pantry");
        assert_eq!(el.color, "#90EE90");
        assert_eq!(s.text_elements().len(), 1);
        assert_eq!(entries(&s), 3);
    }

    #[test]
    fn test_pointer_down_commits_open_text() {
        let (mut s, _) = white_session();
        s.set_tool(Tool::Text);
        s.pointer_down(10.0, 30.0);
        s.set_text_input("Hall");
        s.pointer_down(60.0, 60.0);

        assert_eq!(s.text_elements().len(), 1);
        assert_eq!(s.text_elements()[0].text, "Hall");
    }

    #[test]
    fn test_drag_captures_once() {
        let (mut s, _) = white_session();
        s.set_tool(Tool::Text);
        s.pointer_down(10.0, 30.0);
        s.set_text_input("Bath");
        let id = s.commit_text().unwrap();
        assert_eq!(entries(&s), 2);

        s.set_tool(Tool::Pointer);
        assert_eq!(s.pointer_down(12.0, 25.0), PointerOutcome::DragStarted(id));
        assert!(s.pointer_move(22.0, 35.0));
        assert!(s.pointer_move(32.0, 45.0));
        assert_eq!(entries(&s), 2);

        assert!(s.pointer_up());
        assert_eq!(entries(&s), 3);
        // Grab offset (-2, 5) is preserved
        let el = &s.text_elements()[0];
        assert_eq!((el.x, el.y), (30.0, 50.0));

        assert!(s.undo());
        let el = &s.text_elements()[0];
        assert_eq!((el.x, el.y), (10.0, 30.0));
    }

    #[test]
    fn test_pointer_down_on_empty_space_does_nothing() {
        let (mut s, _) = white_session();
        s.set_tool(Tool::Pointer);
        assert_eq!(s.pointer_down(50.0, 50.0), PointerOutcome::Ignored);
        assert!(!s.pointer_move(60.0, 60.0));
        assert!(!s.pointer_up());
    }

    #[test]
    fn test_delete_text() {
        let (mut s, _) = white_session();
        s.set_tool(Tool::Text);
        s.pointer_down(10.0, 30.0);
        s.set_text_input("Closet");
        let id = s.commit_text().unwrap();

        assert!(s.delete_text(id));
        assert!(s.text_elements().is_empty());
        assert_eq!(entries(&s), 3);
        assert!(!s.delete_text(id));

        s.undo();
        assert_eq!(s.text_elements().len(), 1);
    }

    #[test]
    fn test_undo_restores_formatting() {
        let (mut s, _) = white_session();
        s.set_text_size(36);
        s.set_bold(true);
        s.pointer_down(5.0, 5.0);
        assert_eq!(entries(&s), 2);

        s.undo();
        assert_eq!(s.state().text_size, 16);
        assert!(!s.state().bold);
        s.redo();
        assert_eq!(s.state().text_size, 36);
        assert!(s.state().bold);
    }

    #[test]
    fn test_histories_are_per_image() {
        let mut s = session(50, 50);
        let first = s.upload("a.png", png_bytes(50, 50));
        let second = s.upload("b.png", png_bytes(50, 50));
        assert_eq!(s.current_image_id(), Some(first.as_str()));

        s.pointer_down(5.0, 5.0);
        assert!(s.select_image(&second));
        assert_eq!(s.pixels().unwrap().count_color(Rgba::WHITE), 2500);
        assert!(!s.can_undo());

        assert!(s.select_image(&first));
        assert_eq!(s.pixels().unwrap().count_color(BLUE), 2500);
        assert!(s.can_undo());
        assert_eq!(s.history().get(&second).unwrap().len(), 1);
    }

    #[test]
    fn test_switch_image_commits_open_text() {
        let mut s = session(50, 50);
        let first = s.upload("a.png", png_bytes(50, 50));
        let second = s.upload("b.png", png_bytes(50, 50));

        s.set_tool(Tool::Text);
        s.pointer_down(5.0, 20.0);
        s.set_text_input("Lobby");
        s.select_image(&second);
        assert!(s.text_elements().is_empty());

        s.select_image(&first);
        assert_eq!(s.text_elements()[0].text, "Lobby");
    }

    #[test]
    fn test_select_unknown_image() {
        let (mut s, id) = white_session();
        assert!(!s.select_image("image-0-404"));
        assert_eq!(s.current_image_id(), Some(id.as_str()));
    }

    #[test]
    fn test_remove_selects_neighbor() {
        let mut s = session(20, 20);
        let a = s.upload("a.png", png_bytes(20, 20));
        let b = s.upload("b.png", png_bytes(20, 20));
        let c = s.upload("c.png", png_bytes(20, 20));

        s.select_image(&b);
        assert!(s.remove_image(&b));
        assert_eq!(s.current_image_id(), Some(c.as_str()));
        assert!(!s.history().contains(&b));

        assert!(s.remove_image(&c));
        assert_eq!(s.current_image_id(), Some(a.as_str()));

        assert!(s.remove_image(&a));
        assert_eq!(s.current_image_id(), None);
        assert!(s.pixels().is_none());
        assert!(!s.remove_image(&a));
        assert_eq!(s.pointer_down(1.0, 1.0), PointerOutcome::Ignored);
    }

    #[test]
    fn test_decode_failure_keeps_session_usable() {
        let (mut s, id) = white_session();
        let broken = s.upload("broken.png", vec![0, 1, 2, 3]);

        assert!(matches!(
            s.images().upload_state(&broken),
            Some(crate::state::UploadState::Failed(_))
        ));
        assert!(!s.select_image(&broken));
        assert_eq!(s.current_image_id(), Some(id.as_str()));
        assert!(matches!(
            s.pointer_down(1.0, 1.0),
            PointerOutcome::Filled { .. }
        ));
    }

    #[test]
    fn test_background_decode() {
        let mut s = session(30, 30).with_background_decoder().unwrap();
        let id = s.upload("plan.png", png_bytes(30, 30));
        assert_eq!(s.current_image_id(), None);

        assert_eq!(s.wait_for_decodes(Duration::from_secs(10)), 1);
        assert_eq!(s.current_image_id(), Some(id.as_str()));
        assert_eq!(s.poll_decoded(), 0);
    }

    #[test]
    fn test_stale_decode_result_is_dropped() {
        let mut s = session(30, 30);
        let result = decode_image("image-1-1".into(), "late.png".into(), png_bytes(30, 30));
        assert!(!s.complete_decode(result));
        assert!(s.images().is_empty());
        assert!(!s.history().contains("image-1-1"));
    }

    #[test]
    fn test_removed_while_decoding() {
        let mut s = session(30, 30).with_background_decoder().unwrap();
        let id = s.upload("plan.png", png_bytes(30, 30));
        assert!(s.remove_image(&id));

        s.wait_for_decodes(Duration::from_secs(10));
        assert!(s.images().is_empty());
        assert_eq!(s.current_image_id(), None);
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let (mut s, _) = white_session();
        s.pointer_down(5.0, 5.0);

        assert!(s.handle_key('z', Modifiers::CTRL));
        assert_eq!(cursor(&s), 0);
        assert!(s.handle_key('Z', Modifiers::CTRL_SHIFT));
        assert_eq!(cursor(&s), 1);
        s.undo();
        assert!(s.handle_key('y', Modifiers::META));
        assert_eq!(cursor(&s), 1);

        assert!(s.handle_key('t', Modifiers::NONE));
        assert_eq!(s.state().tool, Tool::Text);
    }

    #[test]
    fn test_letterboxed_canvas() {
        // 2:1 image in a square canvas leaves transparent bands top and bottom
        let mut s = session(40, 40);
        s.upload("wide.png", png_bytes(40, 20));
        let pixels = s.pixels().unwrap();
        assert_eq!(pixels.get(20, 2), Some(Rgba::TRANSPARENT));
        assert_eq!(pixels.get(20, 20), Some(Rgba::WHITE));
    }

    #[test]
    fn test_from_config() {
        let mut config = EditorConfig::default();
        config.preferences.canvas_width = 64;
        config.preferences.default_color = "#FFFFE0".to_string();
        config.keybindings.tool_text = 'x';

        let s = Session::from_config(&config);
        assert_eq!(s.config().canvas_width, 64);
        assert_eq!(s.state().color, Rgba::rgb(0xFF, 0xFF, 0xE0));
        assert_eq!(s.keybindings().tool_text, 'x');
    }
}
