//! Text annotations placed on the canvas.
//!
//! Elements keep their insertion order: hit-testing picks the first match in
//! list order, and history equality compares the list pairwise.

use planmark_raster::{TextMeasure, TextStyle};
use serde::{Deserialize, Serialize};

/// Unique identifier for a text element.
pub type TextId = u64;

/// A text label anchored at its baseline origin, in canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub id: TextId,
    /// Left edge of the text
    pub x: f32,
    /// Baseline
    pub y: f32,
    pub text: String,
    /// Hex color, e.g. `#000000`
    pub color: String,
    /// Font size in pixels
    pub size: u32,
    pub bold: bool,
}

impl TextElement {
    pub fn style(&self) -> TextStyle {
        TextStyle::new(self.size, self.bold)
    }

    /// Check if a point is inside the rendered text box.
    ///
    /// The box extends upward from the baseline by the font size.
    pub fn contains_point(&self, x: f32, y: f32, measure: &dyn TextMeasure) -> bool {
        let (width, height) = measure.measure(&self.text, self.style());
        x >= self.x && x <= self.x + width && y >= self.y - height && y <= self.y
    }

    fn apply(&mut self, patch: &TextPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(text) = &patch.text {
            self.text.clone_from(text);
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(bold) = patch.bold {
            self.bold = bold;
        }
    }
}

/// Partial update for a [`TextElement`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub text: Option<String>,
    pub color: Option<String>,
    pub size: Option<u32>,
    pub bold: Option<bool>,
}

impl TextPatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// New content and color, as applied when an element is edited in place.
    pub fn content(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            color: Some(color.into()),
            ..Default::default()
        }
    }
}

/// Ordered collection of text elements for the active image.
#[derive(Debug, Clone)]
pub struct TextStore {
    elements: Vec<TextElement>,
    next_id: TextId,
}

impl Default for TextStore {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            next_id: 1,
        }
    }
}

impl TextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new element. Blank text is rejected and returns `None`.
    pub fn add(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        color: &str,
        size: u32,
        bold: bool,
    ) -> Option<TextId> {
        if text.trim().is_empty() {
            log::debug!("Ignoring blank text at ({}, {})", x, y);
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.elements.push(TextElement {
            id,
            x,
            y,
            text: text.to_string(),
            color: color.to_string(),
            size,
            bold,
        });
        Some(id)
    }

    /// Apply `patch` to the element with `id`. Returns false if it doesn't exist.
    pub fn update(&mut self, id: TextId, patch: &TextPatch) -> bool {
        match self.elements.iter_mut().find(|el| el.id == id) {
            Some(element) => {
                element.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn move_to(&mut self, id: TextId, x: f32, y: f32) -> bool {
        self.update(id, &TextPatch::position(x, y))
    }

    /// Remove the element with `id`. Returns false if it doesn't exist.
    pub fn delete(&mut self, id: TextId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|el| el.id != id);
        self.elements.len() != before
    }

    /// First element, in list order, whose text box contains the point.
    pub fn hit_test(&self, x: f32, y: f32, measure: &dyn TextMeasure) -> Option<&TextElement> {
        self.elements
            .iter()
            .find(|el| el.contains_point(x, y, measure))
    }

    pub fn get(&self, id: TextId) -> Option<&TextElement> {
        self.elements.iter().find(|el| el.id == id)
    }

    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    /// Replace the whole list, e.g. when restoring a history entry.
    ///
    /// Future ids stay above every restored id so they remain unique.
    pub fn replace_all(&mut self, elements: Vec<TextElement>) {
        if let Some(max_id) = elements.iter().map(|el| el.id).max() {
            self.next_id = self.next_id.max(max_id + 1);
        }
        self.elements = elements;
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planmark_raster::EstimatedMetrics;

    fn store_with_room_a() -> (TextStore, TextId) {
        let mut store = TextStore::new();
        let id = store
            .add(10.0, 10.0, "Room A", "#000000", 16, false)
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut store = TextStore::new();
        let a = store.add(0.0, 0.0, "A", "#000000", 16, false).unwrap();
        let b = store.add(0.0, 0.0, "B", "#000000", 16, false).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_rejects_blank_text() {
        let mut store = TextStore::new();
        assert_eq!(store.add(0.0, 0.0, "   ", "#000000", 16, false), None);
        assert_eq!(store.add(0.0, 0.0, "", "#000000", 16, false), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_replaces_fields_in_place() {
        let mut store = TextStore::new();
        store.add(0.0, 0.0, "first", "#000000", 16, false);
        let id = store.add(5.0, 5.0, "second", "#000000", 16, false).unwrap();
        store.add(9.0, 9.0, "third", "#000000", 16, false);

        assert!(store.update(id, &TextPatch::content("Kitchen", "#FF0000")));

        let el = &store.elements()[1];
        assert_eq!(el.id, id);
        assert_eq!(el.text, "Kitchen");
        assert_eq!(el.color, "#FF0000");
        assert_eq!((el.x, el.y), (5.0, 5.0));
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let (mut store, _) = store_with_room_a();
        assert!(!store.update(999, &TextPatch::position(1.0, 1.0)));
        assert!(!store.move_to(999, 1.0, 1.0));
        assert!(!store.delete(999));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_move_and_delete() {
        let (mut store, id) = store_with_room_a();
        assert!(store.move_to(id, 40.0, 50.0));
        assert_eq!(store.get(id).map(|el| (el.x, el.y)), Some((40.0, 50.0)));

        assert!(store.delete(id));
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_hit_test_room_a() {
        let (store, id) = store_with_room_a();
        let metrics = EstimatedMetrics::default();

        assert_eq!(store.hit_test(10.0, 8.0, &metrics).map(|el| el.id), Some(id));
        assert!(store.hit_test(200.0, 200.0, &metrics).is_none());
        // Below the baseline is outside the box.
        assert!(store.hit_test(10.0, 11.0, &metrics).is_none());
    }

    #[test]
    fn test_hit_test_returns_first_in_order() {
        let mut store = TextStore::new();
        let first = store.add(0.0, 20.0, "Hall", "#000000", 16, false).unwrap();
        store.add(0.0, 20.0, "Hall", "#000000", 16, false);

        let hit = store.hit_test(2.0, 10.0, &EstimatedMetrics::default());
        assert_eq!(hit.map(|el| el.id), Some(first));
    }

    #[test]
    fn test_replace_all_keeps_ids_unique() {
        let (mut store, id) = store_with_room_a();
        let restored = vec![TextElement {
            id: 42,
            x: 0.0,
            y: 0.0,
            text: "Old".into(),
            color: "#000000".into(),
            size: 12,
            bold: true,
        }];
        store.replace_all(restored);
        assert!(store.get(id).is_none());

        let new_id = store.add(1.0, 1.0, "New", "#000000", 16, false).unwrap();
        assert!(new_id > 42);
    }
}
