//! CLI command implementations (facade).
//!
//! This module re-exports the command surface used by `run.rs`.
//! Implementations live in `commands/*`.

mod common;
mod config;
mod phase;
mod project;
mod prompt;
mod reconcile;
mod status;
mod sync;

pub use config::execute_config_command;
pub use phase::{
    execute_complete_command, execute_phases_command, execute_set_status_command,
    execute_start_command, execute_step_command,
};
pub use project::{
    execute_close_command, execute_delete_command, execute_open_command,
    execute_projects_command, execute_reset_command,
};
pub use prompt::{execute_extract_command, execute_prompt_command};
pub use reconcile::execute_reconcile_command;
pub use status::execute_status_command;
pub use sync::{execute_sync_pull_command, execute_sync_push_command};
