//! Configuration file support for planmark.
//!
//! Settings are stored as versioned JSON. A file written by a newer release is
//! rejected rather than half-understood.

use std::path::Path;

use planmark_raster::Rgba;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_COLOR, DEFAULT_FILL_TOLERANCE,
    DEFAULT_TEXT_SIZE, HISTORY_SAMPLE_STRIDE_PIXELS,
};
use crate::history::HistoryConfig;
use crate::keybindings::{KeyBindings, key_to_string};
use crate::model::{EditorState, Tool};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Editor configuration that can be saved and loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Editing defaults
    #[serde(default)]
    pub preferences: EditorPreferences,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindingsConfig,
}

fn default_app_name() -> String {
    "planmark".to_string()
}

/// Editing defaults section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorPreferences {
    /// Canvas width in pixels
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,

    /// Canvas height in pixels
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,

    /// Per-channel tolerance of the fill tool
    #[serde(default = "default_fill_tolerance")]
    pub fill_tolerance: u8,

    /// Initially selected color, as hex
    #[serde(default = "default_color")]
    pub default_color: String,

    /// Initially selected text size in pixels
    #[serde(default = "default_text_size")]
    pub default_text_size: u32,

    /// Whether new text starts bold
    #[serde(default)]
    pub default_bold: bool,

    /// History compares one pixel out of this many
    #[serde(default = "default_sample_stride")]
    pub history_sample_stride: usize,

    /// Maximum history entries per image; unbounded when absent
    #[serde(default)]
    pub max_history_entries: Option<usize>,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_canvas_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_fill_tolerance() -> u8 {
    DEFAULT_FILL_TOLERANCE
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_text_size() -> u32 {
    DEFAULT_TEXT_SIZE
}

fn default_sample_stride() -> usize {
    HISTORY_SAMPLE_STRIDE_PIXELS
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            fill_tolerance: default_fill_tolerance(),
            default_color: default_color(),
            default_text_size: default_text_size(),
            default_bold: false,
            history_sample_stride: default_sample_stride(),
            max_history_entries: None,
            log_level: LogLevel::default(),
        }
    }
}

impl EditorPreferences {
    /// Initial editor state for a new session.
    ///
    /// An unparseable default color falls back to the built-in one.
    pub fn editor_state(&self) -> EditorState {
        let color = match Rgba::from_hex(&self.default_color) {
            Ok(color) => color,
            Err(e) => {
                log::warn!(
                    "Invalid default color '{}' in config ({}), using {}",
                    self.default_color,
                    e,
                    DEFAULT_COLOR
                );
                EditorState::default().color
            }
        };
        EditorState {
            tool: Tool::default(),
            color,
            text_size: self.default_text_size,
            bold: self.default_bold,
            fill_tolerance: self.fill_tolerance,
        }
    }

    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            sample_stride_pixels: self.history_sample_stride.max(1),
            max_entries: self.max_history_entries,
        }
    }
}

/// Keybinding configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindingsConfig {
    pub undo: char,
    pub redo: char,
    pub tool_pointer: char,
    pub tool_fill: char,
    pub tool_text: char,
}

impl Default for KeyBindingsConfig {
    fn default() -> Self {
        Self::from(&KeyBindings::default())
    }
}

impl From<&KeyBindings> for KeyBindingsConfig {
    fn from(bindings: &KeyBindings) -> Self {
        Self {
            undo: bindings.undo,
            redo: bindings.redo,
            tool_pointer: bindings.tool_pointer,
            tool_fill: bindings.tool_fill,
            tool_text: bindings.tool_text,
        }
    }
}

impl KeyBindingsConfig {
    pub fn to_keybindings(&self) -> KeyBindings {
        KeyBindings {
            undo: self.undo,
            redo: self.redo,
            tool_pointer: self.tool_pointer,
            tool_fill: self.tool_fill,
            tool_text: self.tool_text,
        }
    }
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: EditorPreferences::default(),
            keybindings: KeyBindingsConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        let bindings = config.keybindings.to_keybindings();
        for tool in Tool::all() {
            let key = bindings.key_for_tool(*tool);
            if let Some(bound_to) = bindings.key_conflict(key, Some(*tool)) {
                return Err(ConfigError::KeyConflict {
                    key: key_to_string(key),
                    tool: tool.name().to_string(),
                    bound_to,
                });
            }
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "planmark-config.json"
    }

    /// Load configuration from an explicit file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to an explicit file, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default config file path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("planmark").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("planmark")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// Two tools share a hotkey
    #[error("Key {key} for the {tool} tool is already bound to the {bound_to}")]
    KeyConflict {
        key: String,
        tool: String,
        bound_to: String,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
