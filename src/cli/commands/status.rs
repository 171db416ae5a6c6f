//! Status command implementation
//!
//! Handles `vibeflow status` and `vibeflow status --json`.

use anyhow::{Result, bail};
use serde_json::json;

use super::common::{StoreSession, emit_json};

use crate::genius::Checkpoints;
use crate::types::Phase;
use crate::{Config, ProjectWorkflow};

/// Execute the status command
pub fn execute_status_command(project: Option<&str>, json: bool, config: &Config) -> Result<()> {
    let session = StoreSession::open(config)?;
    let store = &session.store;

    let (label, workflow) = match project {
        Some(id) => match store.project_workflow(id) {
            Some(workflow) => (Some(id), workflow),
            None => bail!("No stored workflow for project '{id}'"),
        },
        None => (store.active_project_id(), store.workflow()),
    };
    let checkpoints = Checkpoints::from_phases(&workflow.phases);

    if json {
        let output = json!({
            "projectId": label,
            "currentPhase": workflow.current_phase,
            "currentSubPhase": workflow.current_sub_phase,
            "phases": &workflow.phases,
            "conversationContext": &workflow.conversation_context,
            "checkpoints": checkpoints,
            "nextRequiredAction": checkpoints.next_required_action(),
            "activeSkills": store.active_skills(),
        });
        println!("{}", emit_json(&output)?);
        return Ok(());
    }

    print_workflow(label, workflow);
    match checkpoints.next_required_action() {
        Some(action) => println!("\nNext: {action}"),
        None => println!("\nAll checkpoints met"),
    }
    Ok(())
}

fn print_workflow(project: Option<&str>, workflow: &ProjectWorkflow) {
    match project {
        Some(id) => println!("Project: {id}"),
        None => println!("Project: (none active)"),
    }
    let current = workflow.current_phase;
    print!("  Phase: {} ({})", current, current.label());
    match workflow.current_sub_phase {
        Some(step) => println!(", step: {step}"),
        None => println!(),
    }

    println!("\nPhases:");
    for phase in Phase::ALL {
        let info = &workflow.phases[phase];
        let marker = if phase == current { "▶" } else { " " };
        let artifact = info
            .artifact
            .as_deref()
            .map(|path| format!("  [{path}]"))
            .unwrap_or_default();
        println!("  {marker} {:<16} {:<18}{artifact}", phase.as_str(), info.status.as_str());
    }

    let fields = workflow.conversation_context.set_fields();
    if !fields.is_empty() {
        println!("\nContext:");
        for field in fields {
            if let Some(value) = workflow.conversation_context.get(field) {
                let rendered = serde_json::to_string(&value).unwrap_or_default();
                println!("  {field}: {}", truncate(&rendered, 72));
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
