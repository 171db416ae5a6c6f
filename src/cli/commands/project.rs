//! Project selection commands
//!
//! Handles `vibeflow open`, `close`, `projects`, `delete` and `reset`.

use anyhow::Result;
use serde_json::json;
use std::path::Path;

use super::common::{StoreSession, emit_json};

use crate::Config;
use crate::fs::LocalFs;

/// Switch to (or create) a project, optionally catching up with disk and
/// the state document.
pub async fn execute_open_command(
    id: &str,
    project_path: &Path,
    reconcile: bool,
    pull: bool,
    config: &Config,
) -> Result<()> {
    let mut session = StoreSession::open(config)?;
    let existed = session.store.project_workflow(id).is_some();
    session.store.init_project_workflow(id);

    if existed {
        println!("Switched to project '{id}'");
    } else {
        println!("✓ Created workflow for project '{id}'");
    }

    let fs = LocalFs::new();
    if reconcile {
        let report = session
            .store
            .recalculate_current_phase_from_artifacts(&fs, project_path)
            .await;
        if report.satisfied.is_empty() {
            println!("  No artifacts found in {}", project_path.display());
        } else {
            let names: Vec<&str> = report.satisfied.iter().map(|p| p.as_str()).collect();
            println!("  ✓ Artifacts found for: {}", names.join(", "));
        }
    }
    if pull {
        match session.store.sync_from_genius_state(&fs, project_path).await {
            Some(phase) => println!("  ✓ Adopted phase from state document: {phase}"),
            None => println!("  No readable state document"),
        }
    }

    session.save()?;
    println!("  Phase: {}", session.store.current_phase());
    Ok(())
}

pub fn execute_close_command(config: &Config) -> Result<()> {
    let mut session = StoreSession::open(config)?;
    session.store.switch_to_project(None);
    session.save()?;
    println!("No project active");
    Ok(())
}

pub fn execute_projects_command(json: bool, config: &Config) -> Result<()> {
    let session = StoreSession::open(config)?;
    let store = &session.store;
    let active = store.active_project_id();

    if json {
        let projects: Vec<_> = store
            .project_ids()
            .filter_map(|id| store.project_workflow(id).map(|w| (id, w)))
            .map(|(id, workflow)| {
                json!({
                    "id": id,
                    "active": Some(id) == active,
                    "currentPhase": workflow.current_phase,
                })
            })
            .collect();
        println!("{}", emit_json(&json!({ "projects": projects }))?);
        return Ok(());
    }

    let mut any = false;
    for id in store.project_ids() {
        any = true;
        let marker = if Some(id) == active { "*" } else { " " };
        let phase = store
            .project_workflow(id)
            .map(|w| w.current_phase.as_str())
            .unwrap_or_default();
        println!("{marker} {id:<24} {phase}");
    }
    if !any {
        println!("No projects yet (use `vibeflow open <id>`)");
    }
    Ok(())
}

pub fn execute_delete_command(id: &str, config: &Config) -> Result<()> {
    let mut session = StoreSession::open(config)?;
    if session.store.project_workflow(id).is_none() {
        println!("No stored workflow for project '{id}'");
        return Ok(());
    }
    session.store.delete_project_workflow(id);
    session.save()?;
    println!("✓ Deleted workflow for project '{id}'");
    Ok(())
}

pub fn execute_reset_command(config: &Config) -> Result<()> {
    let mut session = StoreSession::open(config)?;
    session.store.reset_workflow();
    session.save()?;
    println!("✓ Reset workflow for {}", session.project_label());
    Ok(())
}
