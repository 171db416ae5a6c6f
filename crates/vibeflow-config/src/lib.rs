//! Configuration management for vibeflow
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. The file is `.vibeflow/config.toml` with optional
//! `[extraction]`, `[sync]`, `[workflow]` and `[logging]` sections.
//!
//! ```toml
//! [extraction]
//! max_user_stories = 10
//! summary_max_chars = 800
//!
//! [sync]
//! state_file = ".genius/STATE.json"
//!
//! [workflow]
//! strict_status_transitions = true
//! ```

mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use model::*;

/// Directory holding vibeflow's own files inside a project or home.
pub const CONFIG_DIR_NAME: &str = ".vibeflow";

/// Name of the configuration file inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable pointing at a directory that contains `config.toml`.
pub const HOME_ENV_VAR: &str = "VIBEFLOW_HOME";
