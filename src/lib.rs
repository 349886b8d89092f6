//! planmark - floor-plan annotation editor
//!
//! Editing engine for recoloring rooms on uploaded floor plans and labelling
//! them with text. Each image keeps its own snapshot-based undo/redo history,
//! and the result is exported as a flattened PNG.

pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod history;
pub mod keybindings;
pub mod model;
pub mod script;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_image;

pub use config::EditorConfig;
pub use error::SessionError;
pub use session::{PointerOutcome, PointerPhase, Session, SessionConfig};
