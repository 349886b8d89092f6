//! Global constants for the planmark editor

/// Default canvas width in pixels
pub const DEFAULT_CANVAS_WIDTH: u32 = 1024;

/// Default canvas height in pixels
pub const DEFAULT_CANVAS_HEIGHT: u32 = 768;

/// Per-channel tolerance used by the fill tool
pub const DEFAULT_FILL_TOLERANCE: u8 = 5;

/// Initially selected color (light blue)
pub const DEFAULT_COLOR: &str = "#ADD8E6";

/// Initially selected text size in pixels
pub const DEFAULT_TEXT_SIZE: u32 = 16;

/// Text sizes offered by the toolbar
pub const TEXT_SIZES: [u32; 5] = [12, 16, 24, 36, 48];

/// Preset fill/text colors offered by the toolbar
pub const PALETTE: [(&str, &str); 7] = [
    ("White", "#FFFFFF"),
    ("Black", "#000000"),
    ("Pink", "#FFC0CB"),
    ("Yellow", "#FFFFE0"),
    ("Blue", "#ADD8E6"),
    ("Green", "#90EE90"),
    ("Purple", "#E6E6FA"),
];

/// History equality samples one pixel out of this many
pub const HISTORY_SAMPLE_STRIDE_PIXELS: usize = 1000;

/// Suggested file name for exported images
pub const EXPORT_FILENAME: &str = "floor-plan-edited.png";
