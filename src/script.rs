//! Edit scripts: a JSON list of editing steps replayed against a session.
//!
//! Used by the command line to edit images without a UI. Image paths are
//! resolved relative to the script's directory.
//!
//! ```json
//! { "steps": [
//!     { "op": "upload", "path": "plan.png" },
//!     { "op": "color", "hex": "#90EE90" },
//!     { "op": "click", "x": 120, "y": 80 },
//!     { "op": "text", "x": 100, "y": 60, "text": "Kitchen" },
//!     { "op": "undo" }
//! ] }
//! ```

use std::path::{Path, PathBuf};

use planmark_raster::RasterError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Tool;
use crate::session::Session;
use crate::state::UploadState;

/// One step of an edit script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Upload an image file
    Upload {
        path: PathBuf,
        /// Display name, defaults to the file name
        #[serde(default)]
        name: Option<String>,
    },
    /// Select an uploaded image by upload order, starting at 0
    Select { index: usize },
    /// Remove an uploaded image by upload order
    Remove { index: usize },
    Tool { tool: Tool },
    Color { hex: String },
    TextSize { size: u32 },
    Bold { bold: bool },
    Tolerance { tolerance: u8 },
    /// Press and release the pointer with the selected tool
    Click { x: f32, y: f32 },
    /// Press at `from`, move to `to`, release
    Drag { from: [f32; 2], to: [f32; 2] },
    /// Place text with the text tool, or rewrite the label under the point
    Text { x: f32, y: f32, text: String },
    Undo,
    Redo,
}

/// A parsed edit script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditScript {
    pub steps: Vec<Step>,
}

impl EditScript {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Errors that stop a script replay.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Script or image file could not be read
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Script JSON is malformed
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    /// An uploaded file could not be decoded
    #[error("Step {step}: upload of '{name}' failed: {message}")]
    UploadFailed {
        step: usize,
        name: String,
        message: String,
    },

    /// Step refers to an image index that was never uploaded
    #[error("Step {step}: no uploaded image at index {index}")]
    UnknownImage { step: usize, index: usize },

    /// Invalid color value
    #[error("Step {step}: {source}")]
    Color {
        step: usize,
        #[source]
        source: RasterError,
    },
}

/// Replay `script` against `session`. Returns the number of steps run.
pub fn run_script(
    script: &EditScript,
    base_dir: &Path,
    session: &mut Session,
) -> Result<usize, ScriptError> {
    let mut uploaded: Vec<String> = Vec::new();

    for (step_index, step) in script.steps.iter().enumerate() {
        log::debug!("Step {}: {:?}", step_index, step);
        match step {
            Step::Upload { path, name } => {
                let full_path = base_dir.join(path);
                let bytes = std::fs::read(&full_path).map_err(|source| ScriptError::Io {
                    path: full_path.clone(),
                    source,
                })?;
                let name = name.clone().unwrap_or_else(|| {
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string())
                });
                let id = session.upload(&name, bytes);
                if let Some(UploadState::Failed(message)) = session.images().upload_state(&id) {
                    return Err(ScriptError::UploadFailed {
                        step: step_index,
                        name,
                        message,
                    });
                }
                uploaded.push(id);
            }
            Step::Select { index } | Step::Remove { index } => {
                let id = uploaded.get(*index).ok_or(ScriptError::UnknownImage {
                    step: step_index,
                    index: *index,
                })?;
                if matches!(step, Step::Select { .. }) {
                    session.select_image(id);
                } else {
                    session.remove_image(id);
                }
            }
            Step::Tool { tool } => session.set_tool(*tool),
            Step::Color { hex } => {
                session
                    .set_color_hex(hex)
                    .map_err(|source| ScriptError::Color {
                        step: step_index,
                        source,
                    })?;
            }
            Step::TextSize { size } => session.set_text_size(*size),
            Step::Bold { bold } => session.set_bold(*bold),
            Step::Tolerance { tolerance } => session.set_fill_tolerance(*tolerance),
            Step::Click { x, y } => {
                session.pointer_down(*x, *y);
                session.pointer_up();
            }
            Step::Drag { from, to } => {
                session.pointer_down(from[0], from[1]);
                session.pointer_move(to[0], to[1]);
                session.pointer_up();
            }
            Step::Text { x, y, text } => {
                session.set_tool(Tool::Text);
                session.pointer_down(*x, *y);
                session.set_text_input(text);
                session.commit_text();
            }
            Step::Undo => {
                session.undo();
            }
            Step::Redo => {
                session.redo();
            }
        }
    }

    Ok(script.steps.len())
}
