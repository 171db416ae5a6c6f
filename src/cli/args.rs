//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and all subcommand enums.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// vibeflow - phase orchestration for an LLM-guided project assistant
#[derive(Parser, Debug)]
#[command(name = "vibeflow")]
#[command(about = "Drive a project through vibeflow's phases from the command line")]
#[command(long_about = r#"
vibeflow tracks a project from idea to deployment through nine phases, reads
structured answers out of model replies, and keeps .genius/STATE.json in step
with the external genius tool.

EXAMPLES:
  # Open a project and re-derive progress from artifacts on disk
  vibeflow open freelance-track --path ./freelance-track --reconcile

  # Show where the active project stands
  vibeflow status

  # Append the format instructions for the current step to a prompt
  vibeflow prompt "Tell me about your idea"

  # Fold a saved model reply into the conversation context
  vibeflow extract --response reply.txt --input "A time tracker for freelancers"

  # Finish a phase and publish progress to the genius tool
  vibeflow complete discovery --artifact DISCOVERY.xml
  vibeflow sync push

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .vibeflow/config.toml
  Set VIBEFLOW_HOME or use --config to point at a specific file

PHASES:
  welcome → discovery → market-analysis → specifications → design →
  architecture → execution → qa → deployment
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workflow store file (default: <data dir>/vibeflow/workflows.json)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// State document path relative to the project root
    #[arg(long, global = true)]
    pub state_file: Option<String>,

    /// Refuse phase status updates that go backwards
    /// Use --no-strict-transitions to disable
    #[arg(long, global = true, overrides_with = "no_strict_transitions")]
    pub strict_transitions: bool,

    /// Allow phase status updates to go backwards
    #[arg(long, global = true, overrides_with = "strict_transitions")]
    pub no_strict_transitions: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Tri-state view of the strict transition flags.
    #[must_use]
    pub fn strict_transitions_override(&self) -> Option<bool> {
        if self.strict_transitions {
            Some(true)
        } else if self.no_strict_transitions {
            Some(false)
        } else {
            None
        }
    }
}

/// Project directory shared by commands that touch files.
#[derive(Args, Debug, Clone)]
pub struct ProjectPathArg {
    /// Project root directory (default: current directory)
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the active project's phase, step, statuses and context
    Status {
        /// Show a stored project instead of the active one
        #[arg(long)]
        project: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Make a project active, creating its workflow on first use
    ///
    /// EXAMPLES:
    ///   vibeflow open my-app
    ///   vibeflow open my-app --path ./my-app --reconcile --pull
    Open {
        /// Project identifier
        id: String,

        #[command(flatten)]
        project: ProjectPathArg,

        /// Re-derive progress from artifact files after opening
        #[arg(long)]
        reconcile: bool,

        /// Adopt the phase from the state document after opening
        #[arg(long)]
        pull: bool,
    },

    /// Clear the active project selection
    Close,

    /// List stored projects
    Projects {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a project's stored workflow
    Delete {
        /// Project identifier
        id: String,
    },

    /// Start the active project over from the welcome phase
    Reset,

    /// Enter a phase (marks it in progress and makes it current)
    Start {
        /// Phase name, e.g. discovery or market-analysis
        phase: String,
    },

    /// Set the current conversational step (use "none" to clear)
    Step {
        /// Sub-phase name, e.g. target-users
        sub_phase: String,
    },

    /// Complete a phase and move to its successor
    Complete {
        /// Phase name
        phase: String,

        /// Artifact file produced by the phase
        #[arg(long)]
        artifact: Option<String>,
    },

    /// Overwrite one phase's status
    SetStatus {
        /// Phase name
        phase: String,

        /// Status: pending, in_progress, awaiting_approval, approved or completed
        status: String,
    },

    /// Re-derive progress from artifact files in the project directory
    Reconcile {
        #[command(flatten)]
        project: ProjectPathArg,

        /// Use stored statuses only, without looking at files
        #[arg(long)]
        offline: bool,
    },

    /// Exchange progress with the genius tool's state document
    #[command(subcommand)]
    Sync(SyncCommands),

    /// Print a prompt with the format instructions for the current step
    Prompt {
        /// Prompt text (read from stdin when omitted)
        text: Option<String>,

        /// Phase to build for (default: current phase)
        #[arg(long)]
        phase: Option<String>,

        /// Step to build for (default: current step)
        #[arg(long)]
        step: Option<String>,
    },

    /// Fold a model reply into the active project's context
    Extract {
        /// File holding the reply (read from stdin when omitted)
        #[arg(long)]
        response: Option<PathBuf>,

        /// The user's last message, used by keyword fallbacks
        #[arg(long, default_value = "")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List phases with their steps and descriptions
    Phases,

    /// Show the effective configuration and where each value came from
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Sync subcommands
#[derive(Subcommand, Debug)]
pub enum SyncCommands {
    /// Adopt the phase and active skills from the state document
    Pull {
        #[command(flatten)]
        project: ProjectPathArg,
    },

    /// Publish phase, checkpoints and artifacts to the state document
    Push {
        #[command(flatten)]
        project: ProjectPathArg,
    },
}

/// Build the CLI command for testing and introspection
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
