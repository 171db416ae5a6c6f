//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Initializes tracing
//! - Creates the tokio runtime
//! - Dispatches to command handlers
//! - Handles all error output

use anyhow::Result;
use clap::Parser;

use super::args::{Cli, Commands, SyncCommands};
use super::commands;

use crate::error::{ConfigError, FsError, UserFriendlyError};
use crate::{CliArgs, Config, ExitCode, VibeflowError};

/// Main CLI execution function.
///
/// Handles ALL output including errors and returns the exit code on
/// failure. main.rs only calls `std::process::exit`.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        verbose: cli.verbose.then_some(true),
        store_path: cli.store.clone(),
        state_file: cli.state_file.clone(),
        strict_status_transitions: cli.strict_transitions_override(),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            report_error(&err);
            return Err(exit_code_for(&err));
        }
    };

    // A second init (e.g. in tests) is harmless
    let _ = crate::logging::init_tracing(config.logging.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result = rt.block_on(dispatch(cli.command, &config));

    if let Err(error) = result {
        report_error(&error);
        return Err(exit_code_for(&error));
    }
    Ok(())
}

async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Status { project, json } => {
            commands::execute_status_command(project.as_deref(), json, config)
        }
        Commands::Open {
            id,
            project,
            reconcile,
            pull,
        } => commands::execute_open_command(&id, &project.path, reconcile, pull, config).await,
        Commands::Close => commands::execute_close_command(config),
        Commands::Projects { json } => commands::execute_projects_command(json, config),
        Commands::Delete { id } => commands::execute_delete_command(&id, config),
        Commands::Reset => commands::execute_reset_command(config),
        Commands::Start { phase } => commands::execute_start_command(&phase, config),
        Commands::Step { sub_phase } => commands::execute_step_command(&sub_phase, config),
        Commands::Complete { phase, artifact } => {
            commands::execute_complete_command(&phase, artifact, config)
        }
        Commands::SetStatus { phase, status } => {
            commands::execute_set_status_command(&phase, &status, config)
        }
        Commands::Reconcile { project, offline } => {
            commands::execute_reconcile_command(&project.path, offline, config).await
        }
        Commands::Sync(SyncCommands::Pull { project }) => {
            commands::execute_sync_pull_command(&project.path, config).await
        }
        Commands::Sync(SyncCommands::Push { project }) => {
            commands::execute_sync_push_command(&project.path, config).await
        }
        Commands::Prompt { text, phase, step } => {
            commands::execute_prompt_command(text, phase.as_deref(), step.as_deref(), config)
        }
        Commands::Extract {
            response,
            input,
            json,
        } => commands::execute_extract_command(response.as_deref(), &input, json, config),
        Commands::Phases => commands::execute_phases_command(),
        Commands::Config { json } => commands::execute_config_command(json, config),
    }
}

/// Print an error the friendliest way its type allows.
fn report_error(error: &anyhow::Error) {
    if let Some(err) = error.downcast_ref::<VibeflowError>() {
        eprint!("{}", err.display_for_user());
    } else if let Some(err) = error.downcast_ref::<ConfigError>() {
        eprintln!("Error: {}", err.user_message());
        for suggestion in err.suggestions() {
            eprintln!("  • {suggestion}");
        }
    } else if let Some(err) = error.downcast_ref::<FsError>() {
        eprintln!("Error: {}", err.user_message());
    } else {
        eprintln!("✗ {error:#}");
        eprintln!("\n  Run with --verbose for more detailed output");
    }
}

pub(crate) fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    if let Some(err) = error.downcast_ref::<VibeflowError>() {
        err.to_exit_code()
    } else if error.downcast_ref::<ConfigError>().is_some() {
        ExitCode::CLI_ARGS
    } else if error.downcast_ref::<FsError>().is_some()
        || error.downcast_ref::<std::io::Error>().is_some()
    {
        ExitCode::FILESYSTEM
    } else {
        ExitCode::INTERNAL
    }
}
