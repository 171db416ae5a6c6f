//! vibeflow - phase orchestration core for an LLM-guided project assistant
//!
//! vibeflow walks a project from an idea to deployment through nine phases.
//! It does not talk to a model itself: it decides what structured data to
//! ask for at each conversational step, recovers that data from free-form
//! replies, and keeps progress in step with artifact files on disk and with
//! the `.genius/STATE.json` document owned by the external genius tool.
//!
//! vibeflow can be used in two ways:
//! - **CLI**: the `vibeflow` binary operates on a persisted workflow store
//! - **Library**: embed [`WorkflowStore`] in a host application
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Open a project and pick up existing artifacts
//! vibeflow open my-app --path ./my-app --reconcile
//!
//! # Build a prompt for the current step, then fold the reply back in
//! vibeflow prompt "What are you building?"
//! vibeflow extract --response reply.txt --input "A todo app for students"
//!
//! # Publish progress to the genius tool
//! vibeflow sync push --path ./my-app
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust
//! use vibeflow::{Phase, SubPhase, WorkflowStore};
//!
//! let mut store = WorkflowStore::default();
//! store.init_project_workflow("my-app");
//! store.set_phase(Phase::Discovery);
//! store.set_current_sub_phase(Some(SubPhase::ProjectIdea));
//!
//! let update = store.parse_and_update_context(
//!     r#"Nice! <answer field="projectIdea">Todo app for students</answer>"#,
//!     "a todo app",
//! );
//! assert_eq!(update.advanced_to, Some(SubPhase::TargetUsers));
//!
//! store.complete_phase(Phase::Discovery, Some("DISCOVERY.xml".to_string()));
//! assert_eq!(store.current_phase(), Phase::MarketAnalysis);
//! ```
//!
//! # Stable Public API
//!
//! - [`WorkflowStore`], [`ProjectWorkflow`], [`EngineOptions`] - the state machine
//! - [`Phase`], [`PhaseStatus`], [`SubPhase`], [`PhaseInfo`] - closed lifecycle enums
//! - [`ConversationContext`], [`ContextField`], [`ContextPatch`] - extracted data
//! - [`Config`] and [`ConfigBuilder`] - configuration management
//! - [`VibeflowError`] and [`ExitCode`] - errors and CLI exit codes
//!
//! Crate modules are re-exported below for direct access.

// ============================================================================
// Stable Public API
// ============================================================================

pub use vibeflow_engine::{
    ContextUpdate, EngineOptions, ProjectWorkflow, ReconcileReport, WorkflowStore,
};

pub use vibeflow_utils::context::{ContextField, ContextPatch, ContextValue, ConversationContext};
pub use vibeflow_utils::types::{Phase, PhaseInfo, PhaseStatus, SubPhase};

pub use vibeflow_config::{CliArgs, Config, ConfigBuilder};

pub use vibeflow_utils::error::VibeflowError;
pub use vibeflow_utils::exit_codes::ExitCode;

pub use vibeflow_formats::build_prompt;

// ============================================================================
// Module re-exports
// ============================================================================

pub use vibeflow_config as config;
pub use vibeflow_engine as engine;
pub use vibeflow_extraction as extraction;
pub use vibeflow_formats as formats;
pub use vibeflow_genius as genius;
pub use vibeflow_utils::{atomic_write, context, error, exit_codes, fs, logging, types};

#[cfg(any(test, feature = "test-utils"))]
pub use vibeflow_utils::test_support;

pub mod cli;
