//! Workflow engine for vibeflow
//!
//! Owns the per-project phase state machine ([`WorkflowStore`]) and the
//! operations layered on it:
//!
//! - folding model responses into the conversation context
//!   ([`WorkflowStore::parse_and_update_context`])
//! - re-deriving progress from artifacts on disk
//!   ([`WorkflowStore::recalculate_current_phase_from_artifacts`])
//! - two-way sync with `.genius/STATE.json`
//!   ([`WorkflowStore::sync_from_genius_state`],
//!   [`WorkflowStore::sync_to_genius_state`])
//! - persistence of the whole store ([`WorkflowStore::save`],
//!   [`WorkflowStore::load_or_default`])
//!
//! State-machine operations never fail. Errors only surface from
//! persistence, where the caller asked for a file explicitly.

// Re-export the foundation crates so callers need a single dependency
pub use vibeflow_config as config;
pub use vibeflow_extraction as extraction;
pub use vibeflow_formats as formats;
pub use vibeflow_genius as genius;
pub use vibeflow_utils::{context, error, exit_codes, fs, logging, types};

#[cfg(any(test, feature = "test-utils"))]
pub use vibeflow_utils::test_support;

pub mod options;
pub mod persistence;
pub mod reconcile;
pub mod store;
pub mod sync;
pub mod update;
pub mod workflow;

pub use options::EngineOptions;
pub use persistence::STORE_FILE_VERSION;
pub use reconcile::{ReconcileReport, artifact_candidates};
pub use store::WorkflowStore;
pub use update::ContextUpdate;
pub use workflow::ProjectWorkflow;
