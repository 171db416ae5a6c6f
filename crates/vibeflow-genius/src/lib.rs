//! Model of the `.genius/STATE.json` document shared with the external
//! genius tool.
//!
//! This crate knows the document's shape (phase dictionary, checkpoints,
//! scaffold, skill history). Reading and writing the file is done by the
//! engine through its filesystem collaborator.

pub mod checkpoints;
pub mod document;
pub mod phase_map;
pub mod skills;

pub use checkpoints::Checkpoints;
pub use document::GeniusState;
pub use phase_map::{genius_phase, workflow_phase};
pub use skills::active_skills;

/// Directory holding the document, relative to the project root.
pub const GENIUS_DIR: &str = ".genius";

/// File name of the document inside [`GENIUS_DIR`].
pub const STATE_FILE_NAME: &str = "STATE.json";
