//! Command-line interface for vibeflow
//!
//! Operator commands over the workflow store: inspect and move phases,
//! reconcile with artifacts, sync with the genius state document, and run
//! prompts and replies through the format registry and extractor.
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `run`: Main entry point and command dispatch
//! - `commands`: Command implementations and helpers

pub mod args;
mod commands;
mod run;

pub use args::{Cli, Commands, ProjectPathArg, SyncCommands, build_cli};
pub use run::run;

pub use crate::{CliArgs, Config};
