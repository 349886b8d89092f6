//! Data models for the planmark editor.

mod text;
mod tool;

pub use text::{TextElement, TextId, TextPatch, TextStore};
pub use tool::{EditorState, Tool};
