//! Snapshot-based undo/redo history, one per image.
//!
//! Every edit is captured as a full copy of the editable state (pixels, text
//! elements and formatting) rather than as a reversible command. Each image
//! keeps an append-only list of entries and a cursor; `entries[cursor]` is what
//! the canvas currently shows. Capturing after an undo discards the redo branch.

use std::collections::HashMap;

use planmark_raster::PixelBuffer;

use crate::constants::{DEFAULT_TEXT_SIZE, HISTORY_SAMPLE_STRIDE_PIXELS};
use crate::model::TextElement;

// ============================================================================
// History Entries
// ============================================================================

/// One captured state of an image's edits.
///
/// Each entry owns its pixel buffer; nothing else holds a reference to it.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Text elements at capture time, in list order
    pub text_elements: Vec<TextElement>,
    /// Canvas pixels. `None` only for the pristine first entry before the
    /// image has been rendered.
    pub pixels: Option<PixelBuffer>,
    /// Selected text size at capture time
    pub text_size: u32,
    /// Selected bold flag at capture time
    pub bold: bool,
}

impl HistoryEntry {
    /// The pristine entry every image history starts from.
    pub fn initial(text_elements: Vec<TextElement>) -> Self {
        Self {
            text_elements,
            pixels: None,
            text_size: DEFAULT_TEXT_SIZE,
            bold: false,
        }
    }

    /// Compare two entries the way captures are deduplicated.
    ///
    /// Formatting and text elements are compared exactly. Pixels are compared
    /// by sampling one byte every `stride_pixels` pixels, so an edit that only
    /// touches unsampled pixels compares equal. Large canvases make a full
    /// compare on every edit too slow, and the miss rate is accepted.
    pub fn matches(&self, other: &HistoryEntry, stride_pixels: usize) -> bool {
        if self.text_size != other.text_size || self.bold != other.bold {
            return false;
        }
        if self.text_elements != other.text_elements {
            return false;
        }
        match (&self.pixels, &other.pixels) {
            (Some(a), Some(b)) => a.sampled_eq(b, stride_pixels),
            (None, None) => true,
            _ => false,
        }
    }
}

// ============================================================================
// Per-image History
// ============================================================================

/// Configuration for image histories
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryConfig {
    /// Pixel stride used when comparing snapshots (1 compares every pixel)
    pub sample_stride_pixels: usize,
    /// Maximum number of entries kept per image; `None` keeps everything
    pub max_entries: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            sample_stride_pixels: HISTORY_SAMPLE_STRIDE_PIXELS,
            max_entries: None,
        }
    }
}

/// Entries and cursor for a single image.
///
/// Invariant: `entries` is never empty and `cursor < entries.len()`.
#[derive(Debug, Clone)]
pub struct ImageHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    config: HistoryConfig,
}

impl ImageHistory {
    /// Start a history with the pristine entry.
    pub fn new(initial_text_elements: Vec<TextElement>, config: HistoryConfig) -> Self {
        Self {
            entries: vec![HistoryEntry::initial(initial_text_elements)],
            cursor: 0,
            config,
        }
    }

    /// The entry the canvas currently reflects.
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `entry` unless it matches the current entry.
    ///
    /// Any entries after the cursor (the redo branch) are discarded.
    /// Returns true if the entry was appended.
    pub fn capture_if_changed(&mut self, entry: HistoryEntry) -> bool {
        if self
            .current()
            .matches(&entry, self.config.sample_stride_pixels)
        {
            log::trace!("History: capture skipped, state unchanged");
            return false;
        }

        let discarded = self.entries.len() - (self.cursor + 1);
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;

        if let Some(max) = self.config.max_entries {
            let max = max.max(1);
            if self.entries.len() > max {
                let excess = self.entries.len() - max;
                self.entries.drain(..excess);
                self.cursor -= excess;
            }
        }

        log::debug!(
            "📝 History: captured entry {} ({} redo entries discarded)",
            self.cursor,
            discarded
        );
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Step back one entry and return it, or `None` at the start.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        log::debug!("⏪ History: undo to entry {}", self.cursor);
        Some(&self.entries[self.cursor])
    }

    /// Step forward one entry and return it, or `None` at the end.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::debug!("⏩ History: redo to entry {}", self.cursor);
        Some(&self.entries[self.cursor])
    }

    /// Store the first rendered frame in the pristine entry.
    ///
    /// The initial pixels are only known once the image has been decoded and
    /// drawn, after the history was created. Injecting them here avoids a
    /// spurious first undo step. Ignored once any edit has been captured or
    /// the entry already has pixels.
    pub fn backfill_initial_snapshot(&mut self, pixels: PixelBuffer) -> bool {
        if self.entries.len() != 1 || self.cursor != 0 {
            return false;
        }
        let entry = &mut self.entries[0];
        if entry.pixels.is_some() {
            return false;
        }
        entry.pixels = Some(pixels);
        log::debug!("History: backfilled initial snapshot");
        true
    }
}

// ============================================================================
// Session-wide History Map
// ============================================================================

/// All image histories of a session, keyed by image id.
///
/// Operations on an unknown image id do nothing. Decode completions can arrive
/// after the image was removed, so a missing id is an expected case.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    histories: HashMap<String, ImageHistory>,
    config: HistoryConfig,
}

impl EditHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            histories: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Create the history for an image. Returns false if it already exists.
    pub fn initialize(&mut self, image_id: &str, initial_text_elements: Vec<TextElement>) -> bool {
        if self.histories.contains_key(image_id) {
            return false;
        }
        self.histories.insert(
            image_id.to_string(),
            ImageHistory::new(initial_text_elements, self.config.clone()),
        );
        log::debug!("History: initialized for {}", image_id);
        true
    }

    pub fn contains(&self, image_id: &str) -> bool {
        self.histories.contains_key(image_id)
    }

    pub fn get(&self, image_id: &str) -> Option<&ImageHistory> {
        self.histories.get(image_id)
    }

    /// Drop an image's history. Returns false if there was none.
    pub fn remove(&mut self, image_id: &str) -> bool {
        let removed = self.histories.remove(image_id).is_some();
        if removed {
            log::debug!("🗑️ History: removed for {}", image_id);
        }
        removed
    }

    pub fn current(&self, image_id: &str) -> Option<&HistoryEntry> {
        self.histories.get(image_id).map(ImageHistory::current)
    }

    pub fn capture_if_changed(&mut self, image_id: &str, entry: HistoryEntry) -> bool {
        match self.histories.get_mut(image_id) {
            Some(history) => history.capture_if_changed(entry),
            None => {
                log::debug!("History: capture for unknown image {} ignored", image_id);
                false
            }
        }
    }

    pub fn undo(&mut self, image_id: &str) -> Option<&HistoryEntry> {
        self.histories.get_mut(image_id)?.undo()
    }

    pub fn redo(&mut self, image_id: &str) -> Option<&HistoryEntry> {
        self.histories.get_mut(image_id)?.redo()
    }

    pub fn can_undo(&self, image_id: &str) -> bool {
        self.histories
            .get(image_id)
            .is_some_and(ImageHistory::can_undo)
    }

    pub fn can_redo(&self, image_id: &str) -> bool {
        self.histories
            .get(image_id)
            .is_some_and(ImageHistory::can_redo)
    }

    pub fn backfill_initial_snapshot(&mut self, image_id: &str, pixels: PixelBuffer) -> bool {
        self.histories
            .get_mut(image_id)
            .is_some_and(|history| history.backfill_initial_snapshot(pixels))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use planmark_raster::Rgba;

    fn white() -> PixelBuffer {
        PixelBuffer::filled(100, 100, Rgba::WHITE)
    }

    fn entry(pixels: PixelBuffer) -> HistoryEntry {
        HistoryEntry {
            text_elements: Vec::new(),
            pixels: Some(pixels),
            text_size: DEFAULT_TEXT_SIZE,
            bold: false,
        }
    }

    fn label(id: u64, text: &str) -> TextElement {
        TextElement {
            id,
            x: 10.0,
            y: 10.0,
            text: text.to_string(),
            color: "#000000".to_string(),
            size: 16,
            bold: false,
        }
    }

    /// Every capture in a fresh, backfilled history differs in one text label.
    fn history_with_edits(n: u64) -> ImageHistory {
        let mut history = ImageHistory::new(Vec::new(), HistoryConfig::default());
        history.backfill_initial_snapshot(white());
        for i in 0..n {
            let mut e = entry(white());
            e.text_elements.push(label(i, &format!("edit {i}")));
            assert!(history.capture_if_changed(e));
        }
        history
    }

    #[test]
    fn test_initial_state() {
        let history = ImageHistory::new(Vec::new(), HistoryConfig::default());
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(history.current().pixels.is_none());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_monotonic_growth() {
        let history = history_with_edits(5);
        assert_eq!(history.len(), 6);
        assert_eq!(history.cursor(), 5);
    }

    #[test]
    fn test_capture_of_identical_state_is_noop() {
        let mut history = history_with_edits(1);
        let same = history.current().clone();
        assert!(!history.capture_if_changed(same));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_undo_redo_walks_cursor() {
        let mut history = history_with_edits(3);

        assert_eq!(history.undo().map(|e| e.text_elements[0].text.clone()), Some("edit 1".into()));
        assert_eq!(history.cursor(), 2);
        history.undo();
        history.undo();
        assert_eq!(history.cursor(), 0);
        assert!(history.undo().is_none());
        assert_eq!(history.cursor(), 0);

        assert!(history.redo().is_some());
        history.redo();
        history.redo();
        assert!(history.redo().is_none());
        assert_eq!(history.cursor(), 3);
    }

    #[test]
    fn test_new_capture_truncates_redo_branch() {
        let mut history = history_with_edits(3);
        history.undo();
        assert!(history.can_redo());

        let mut branch = entry(white());
        branch.text_elements.push(label(99, "branch"));
        assert!(history.capture_if_changed(branch));

        assert!(!history.can_redo());
        assert_eq!(history.len(), 4);
        assert_eq!(history.cursor(), 3);
        assert!(
            history
                .entries()
                .iter()
                .all(|e| e.text_elements.first().map(|t| t.text.as_str()) != Some("edit 2"))
        );
    }

    #[test]
    fn test_null_pixels_differ_from_some() {
        let a = HistoryEntry::initial(Vec::new());
        let b = entry(white());
        assert!(!a.matches(&b, 1));
        assert!(!b.matches(&a, 1));
        assert!(a.matches(&HistoryEntry::initial(Vec::new()), 1));
    }

    #[test]
    fn test_formatting_is_compared() {
        let a = entry(white());
        let mut b = a.clone();
        b.bold = true;
        assert!(!a.matches(&b, 1));

        let mut c = a.clone();
        c.text_size = 24;
        assert!(!a.matches(&c, 1));
    }

    #[test]
    fn test_text_order_matters() {
        let mut a = entry(white());
        a.text_elements = vec![label(1, "A"), label(2, "B")];
        let mut b = a.clone();
        b.text_elements.reverse();
        assert!(!a.matches(&b, 1));
    }

    #[test]
    fn test_sampled_compare_misses_small_edit() {
        let mut history = ImageHistory::new(Vec::new(), HistoryConfig::default());
        history.backfill_initial_snapshot(white());

        // Pixel 1 is between the samples at 0 and 1000.
        let mut pixels = white();
        pixels.set(1, 0, Rgba::BLACK).unwrap();
        assert!(!history.capture_if_changed(entry(pixels.clone())));

        let mut exact = ImageHistory::new(
            Vec::new(),
            HistoryConfig {
                sample_stride_pixels: 1,
                max_entries: None,
            },
        );
        exact.backfill_initial_snapshot(white());
        assert!(exact.capture_if_changed(entry(pixels)));
    }

    #[test]
    fn test_backfill_only_on_pristine_history() {
        let mut history = ImageHistory::new(Vec::new(), HistoryConfig::default());
        assert!(history.backfill_initial_snapshot(white()));
        // Already has pixels.
        assert!(!history.backfill_initial_snapshot(white()));

        let mut edited = ImageHistory::new(Vec::new(), HistoryConfig::default());
        assert!(edited.capture_if_changed(entry(white())));
        assert!(!edited.backfill_initial_snapshot(white()));
        assert!(edited.entries()[0].pixels.is_none());
    }

    #[test]
    fn test_max_entries_drops_oldest() {
        let mut history = ImageHistory::new(
            Vec::new(),
            HistoryConfig {
                sample_stride_pixels: 1000,
                max_entries: Some(3),
            },
        );
        for i in 0..5 {
            let mut e = entry(white());
            e.text_elements.push(label(i, "x"));
            history.capture_if_changed(e);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.current().text_elements[0].id, 4);
    }

    #[test]
    fn test_map_ignores_unknown_images() {
        let mut map = EditHistory::new(HistoryConfig::default());
        assert!(!map.capture_if_changed("missing", entry(white())));
        assert!(map.undo("missing").is_none());
        assert!(map.redo("missing").is_none());
        assert!(!map.can_undo("missing"));
        assert!(!map.can_redo("missing"));
        assert!(!map.backfill_initial_snapshot("missing", white()));
        assert!(!map.remove("missing"));
    }

    #[test]
    fn test_map_keeps_images_separate() {
        let mut map = EditHistory::new(HistoryConfig::default());
        assert!(map.initialize("a", Vec::new()));
        assert!(map.initialize("b", Vec::new()));
        assert!(!map.initialize("a", Vec::new()));

        map.backfill_initial_snapshot("a", white());
        assert!(map.capture_if_changed("a", entry(PixelBuffer::filled(100, 100, Rgba::BLACK))));

        assert!(map.can_undo("a"));
        assert!(!map.can_undo("b"));
        assert!(map.current("b").is_some_and(|e| e.pixels.is_none()));

        assert!(map.remove("a"));
        assert!(!map.contains("a"));
    }
}
