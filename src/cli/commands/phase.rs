//! Phase transition commands
//!
//! Handles `vibeflow start`, `step`, `complete`, `set-status` and `phases`.

use anyhow::{Result, bail};

use super::common::StoreSession;

use crate::Config;
use crate::formats::{get_first_sub_phase, get_phase_format};
use crate::types::{Phase, PhaseStatus, SubPhase};

/// Enter a phase at its first step.
pub fn execute_start_command(phase: &str, config: &Config) -> Result<()> {
    let phase: Phase = phase.parse()?;
    let mut session = StoreSession::open(config)?;
    session.store.set_phase(phase);
    session.store.set_current_sub_phase(get_first_sub_phase(phase));
    session.save()?;
    println!("▶ {} started for {}", phase.label(), session.project_label());
    Ok(())
}

/// Set or clear the current step. A step from another phase is accepted
/// but warned about, since extraction will ignore it.
pub fn execute_step_command(sub_phase: &str, config: &Config) -> Result<()> {
    let sub_phase = match sub_phase {
        "none" | "" => None,
        name => Some(name.parse::<SubPhase>()?),
    };
    let mut session = StoreSession::open(config)?;
    let current = session.store.current_phase();
    if let Some(step) = sub_phase
        && step.phase() != current
    {
        eprintln!("⚠ Step '{step}' belongs to {}, current phase is {current}", step.phase());
    }
    session.store.set_current_sub_phase(sub_phase);
    session.save()?;
    match sub_phase {
        Some(step) => println!("Step set to {step}"),
        None => println!("Step cleared"),
    }
    Ok(())
}

pub fn execute_complete_command(
    phase: &str,
    artifact: Option<String>,
    config: &Config,
) -> Result<()> {
    let phase: Phase = phase.parse()?;
    let mut session = StoreSession::open(config)?;
    session.store.complete_phase(phase, artifact);
    let next = session.store.current_phase();
    if next != phase {
        session.store.set_current_sub_phase(get_first_sub_phase(next));
    }
    session.save()?;
    println!("✓ {} completed", phase.label());
    if next != phase {
        println!("▶ {} started", next.label());
    }
    Ok(())
}

pub fn execute_set_status_command(phase: &str, status: &str, config: &Config) -> Result<()> {
    let phase: Phase = phase.parse()?;
    let status: PhaseStatus = status.parse()?;
    let mut session = StoreSession::open(config)?;
    let from = session.store.phases()[phase].status;
    if !session.store.update_phase_status(phase, status) {
        bail!(
            "Refused to move {phase} from {from} back to {status} (strict_status_transitions is on)"
        );
    }
    session.save()?;
    println!("{phase}: {from} → {status}");
    Ok(())
}

/// Print every phase with its steps and what each step asks for.
pub fn execute_phases_command() -> Result<()> {
    for phase in Phase::ALL {
        println!("{:<16} {}", phase.as_str(), phase.label());
        println!("{:<16} {}", "", phase.description());
        for step in phase.sub_phases() {
            let field = get_phase_format(phase, Some(*step))
                .map(|format| format.target_field().as_str())
                .unwrap_or_default();
            println!("{:<16}   - {step} → {field}", "");
        }
    }
    Ok(())
}
