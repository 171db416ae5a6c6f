//! Reconcile command implementation

use anyhow::Result;
use std::path::Path;

use super::common::StoreSession;

use crate::Config;
use crate::fs::LocalFs;

/// Re-derive the active project's progress, from artifacts under
/// `project_path` or, with `offline`, from stored statuses only.
pub async fn execute_reconcile_command(
    project_path: &Path,
    offline: bool,
    config: &Config,
) -> Result<()> {
    let mut session = StoreSession::open(config)?;

    if offline {
        let phase = session.store.recalculate_current_phase();
        session.save()?;
        println!("Current phase for {}: {phase}", session.project_label());
        return Ok(());
    }

    let report = session
        .store
        .recalculate_current_phase_from_artifacts(&LocalFs::new(), project_path)
        .await;
    session.save()?;

    println!("Reconciled {} against {}", session.project_label(), project_path.display());
    for phase in &report.satisfied {
        let artifact = session.store.phases()[*phase]
            .artifact
            .as_deref()
            .unwrap_or("conversation context");
        println!("  ✓ {:<16} {artifact}", phase.as_str());
    }
    println!("  Phase: {}", report.current_phase);
    Ok(())
}
