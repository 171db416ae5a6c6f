//! CLI argument parsing tests
//!
//! Parse-only: nothing here touches the workflow store.

use clap::Parser;
use std::path::PathBuf;

use vibeflow::cli::{Cli, Commands, SyncCommands, build_cli};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("vibeflow").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_cli_definition_is_consistent() {
    build_cli().debug_assert();
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["status", "--json", "--store", "/tmp/w.json", "-v"]);
    assert!(cli.verbose);
    assert_eq!(cli.store, Some(PathBuf::from("/tmp/w.json")));
    assert!(matches!(
        cli.command,
        Commands::Status {
            project: None,
            json: true
        }
    ));
}

#[test]
fn test_strict_transition_flags_override_each_other() {
    assert_eq!(parse(&["reset"]).strict_transitions_override(), None);
    assert_eq!(
        parse(&["--strict-transitions", "reset"]).strict_transitions_override(),
        Some(true)
    );
    assert_eq!(
        parse(&["--strict-transitions", "--no-strict-transitions", "reset"])
            .strict_transitions_override(),
        Some(false)
    );
}

#[test]
fn test_open_defaults_to_current_directory() {
    let cli = parse(&["open", "my-app", "--reconcile"]);
    match cli.command {
        Commands::Open {
            id,
            project,
            reconcile,
            pull,
        } => {
            assert_eq!(id, "my-app");
            assert_eq!(project.path, PathBuf::from("."));
            assert!(reconcile);
            assert!(!pull);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_sync_subcommands() {
    let cli = parse(&["sync", "push", "--path", "/work/app"]);
    match cli.command {
        Commands::Sync(SyncCommands::Push { project }) => {
            assert_eq!(project.path, PathBuf::from("/work/app"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
    assert!(matches!(
        parse(&["sync", "pull"]).command,
        Commands::Sync(SyncCommands::Pull { .. })
    ));
}

#[test]
fn test_complete_and_set_status_arguments() {
    match parse(&["complete", "discovery", "--artifact", "DISCOVERY.xml"]).command {
        Commands::Complete { phase, artifact } => {
            assert_eq!(phase, "discovery");
            assert_eq!(artifact.as_deref(), Some("DISCOVERY.xml"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
    assert!(matches!(
        parse(&["set-status", "qa", "approved"]).command,
        Commands::SetStatus { .. }
    ));
}

#[test]
fn test_missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["vibeflow"]).is_err());
    assert!(Cli::try_parse_from(["vibeflow", "sync"]).is_err());
}
