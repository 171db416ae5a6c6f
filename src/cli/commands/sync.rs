//! Sync commands: exchange progress with the genius state document

use anyhow::{Result, bail};
use std::path::Path;

use super::common::StoreSession;

use crate::Config;
use crate::fs::LocalFs;
use crate::genius::Checkpoints;

pub async fn execute_sync_pull_command(project_path: &Path, config: &Config) -> Result<()> {
    let mut session = StoreSession::open(config)?;
    let state_file = session.store.state_file_path(project_path);

    let Some(phase) = session
        .store
        .sync_from_genius_state(&LocalFs::new(), project_path)
        .await
    else {
        println!("No readable state document at {}", state_file.display());
        return Ok(());
    };
    session.save()?;

    println!("✓ Adopted phase {phase} from {}", state_file.display());
    let skills = session.store.active_skills();
    if !skills.is_empty() {
        println!("  Active skills: {}", skills.join(", "));
    }
    Ok(())
}

/// Publish the active workflow. A failed write is an error here so scripts
/// can tell, even though the engine itself only reports `false`.
pub async fn execute_sync_push_command(project_path: &Path, config: &Config) -> Result<()> {
    let session = StoreSession::open(config)?;
    let state_file = session.store.state_file_path(project_path);

    if !session
        .store
        .sync_to_genius_state(&LocalFs::new(), project_path)
        .await
    {
        bail!("Failed to write {}", state_file.display());
    }

    println!("✓ Wrote {}", state_file.display());
    let checkpoints = Checkpoints::from_phases(session.store.phases());
    if let Some(action) = checkpoints.next_required_action() {
        println!("  Next: {action}");
    }
    Ok(())
}
