//! Editing tools and the per-session editor state.

use planmark_raster::Rgba;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COLOR, DEFAULT_FILL_TOLERANCE, DEFAULT_TEXT_SIZE};

/// Tools available in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Select and drag text labels
    Pointer,
    /// Recolor a connected region
    #[default]
    Fill,
    /// Place or edit text labels
    Text,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pointer => "Pointer",
            Tool::Fill => "Magic Brush",
            Tool::Text => "Text",
        }
    }

    /// Get all available tools.
    pub fn all() -> &'static [Tool] {
        &[Tool::Pointer, Tool::Fill, Tool::Text]
    }
}

/// Tool selection and formatting shared by every image in the session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub tool: Tool,
    /// Color used for fills and for new or edited text
    pub color: Rgba,
    /// Font size for new text, in pixels
    pub text_size: u32,
    /// Whether new text is bold
    pub bold: bool,
    /// Per-channel fill tolerance
    pub fill_tolerance: u8,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            color: Rgba::from_hex(DEFAULT_COLOR).unwrap_or(Rgba::WHITE),
            text_size: DEFAULT_TEXT_SIZE,
            bold: false,
            fill_tolerance: DEFAULT_FILL_TOLERANCE,
        }
    }
}
