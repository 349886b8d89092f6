//! Keyboard shortcuts for planmark.
//!
//! Keys are identified by the character they produce, compared case-insensitively.
//! History shortcuts need the primary modifier (Ctrl, or Cmd/Meta on macOS);
//! tool hotkeys are plain key presses.

use crate::model::Tool;

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        meta: false,
        shift: false,
        alt: false,
    };

    pub const META: Modifiers = Modifiers {
        ctrl: false,
        meta: true,
        shift: false,
        alt: false,
    };

    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        meta: false,
        shift: true,
        alt: false,
    };

    /// Ctrl or Cmd/Meta.
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn any(&self) -> bool {
        self.ctrl || self.meta || self.shift || self.alt
    }
}

/// History actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
}

/// Keybinding configuration for the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    /// Primary+key undoes, Primary+Shift+key redoes
    pub undo: char,
    /// Primary+key redoes
    pub redo: char,
    /// Hotkey for the Pointer tool
    pub tool_pointer: char,
    /// Hotkey for the Magic Brush (fill) tool
    pub tool_fill: char,
    /// Hotkey for the Text tool
    pub tool_text: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            undo: 'z',
            redo: 'y',
            tool_pointer: 'v',
            tool_fill: 'f',
            tool_text: 't',
        }
    }
}

fn same_key(a: char, b: char) -> bool {
    a.eq_ignore_ascii_case(&b)
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the history action for a key press, if any.
    pub fn shortcut_for(&self, key: char, modifiers: Modifiers) -> Option<Shortcut> {
        if !modifiers.primary() || modifiers.alt {
            return None;
        }
        if same_key(key, self.undo) {
            if modifiers.shift {
                Some(Shortcut::Redo)
            } else {
                Some(Shortcut::Undo)
            }
        } else if same_key(key, self.redo) {
            Some(Shortcut::Redo)
        } else {
            None
        }
    }

    /// Get the tool that corresponds to a key press, if any.
    pub fn tool_for_key(&self, key: char, modifiers: Modifiers) -> Option<Tool> {
        if modifiers.any() {
            return None;
        }
        if same_key(key, self.tool_pointer) {
            Some(Tool::Pointer)
        } else if same_key(key, self.tool_fill) {
            Some(Tool::Fill)
        } else if same_key(key, self.tool_text) {
            Some(Tool::Text)
        } else {
            None
        }
    }

    /// Get the hotkey for a specific tool.
    pub fn key_for_tool(&self, tool: Tool) -> char {
        match tool {
            Tool::Pointer => self.tool_pointer,
            Tool::Fill => self.tool_fill,
            Tool::Text => self.tool_text,
        }
    }

    /// Check if a key is already used by another tool binding.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, key: char, exclude_tool: Option<Tool>) -> Option<String> {
        Tool::all()
            .iter()
            .filter(|tool| Some(**tool) != exclude_tool)
            .find(|tool| same_key(key, self.key_for_tool(**tool)))
            .map(|tool| format!("{} tool", tool.name()))
    }
}

/// Display string for a key, e.g. `Z`.
pub fn key_to_string(key: char) -> String {
    key.to_uppercase().collect()
}
