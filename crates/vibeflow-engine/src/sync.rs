//! Two-way sync with the external tool's state document
//!
//! Reads adopt the document's phase; writes publish phase, checkpoints and
//! artifacts while preserving everything else in the document. Neither
//! direction reports errors: a missing or broken document on read is the
//! normal state of a new project, and a failed write is logged and reported
//! as `false`.

use std::path::{Path, PathBuf};

use chrono::Utc;

use vibeflow_genius::{Checkpoints, GeniusState};
use vibeflow_utils::fs::ProjectFs;
use vibeflow_utils::types::Phase;

use crate::store::WorkflowStore;

impl WorkflowStore {
    /// Location of the state document for a project.
    #[must_use]
    pub fn state_file_path(&self, project_path: &Path) -> PathBuf {
        project_path.join(&self.options.state_file)
    }

    /// Adopt the document's phase as the current phase and refresh the
    /// active skills list.
    ///
    /// Returns the adopted phase, or `None` when the document could not be
    /// read or parsed (nothing is changed in that case).
    pub async fn sync_from_genius_state(
        &mut self,
        fs: &dyn ProjectFs,
        project_path: &Path,
    ) -> Option<Phase> {
        let path = self.state_file_path(project_path);
        let text = match fs.read(&path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "No state document to sync from");
                return None;
            }
        };
        let state = match GeniusState::parse(&text, &path.display().to_string()) {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable state document");
                return None;
            }
        };

        let phase = state.workflow_phase();
        self.workflow_mut().current_phase = phase;
        self.active_skills = state.active_skills(self.options.history_skills);
        tracing::debug!(
            path = %path.display(),
            phase = %phase,
            skills = ?self.active_skills,
            "Synced from state document"
        );
        Some(phase)
    }

    /// Publish the active workflow into the state document.
    ///
    /// An existing JSON object is updated in place; anything else is
    /// replaced by a fresh scaffold. Returns whether the write succeeded.
    pub async fn sync_to_genius_state(&self, fs: &dyn ProjectFs, project_path: &Path) -> bool {
        let path = self.state_file_path(project_path);
        let shown = path.display().to_string();
        let now = Utc::now();

        let existing = match fs.read(&path).await {
            Ok(text) => GeniusState::parse(&text, &shown)
                .inspect_err(|e| tracing::debug!(error = %e, "Replacing unreadable state document"))
                .ok(),
            Err(_) => None,
        };
        let mut state = existing.unwrap_or_else(|| {
            GeniusState::scaffold(&project_name(project_path), &self.options.schema_version, now)
        });

        let workflow = self.workflow();
        state.apply_workflow(
            workflow.current_phase,
            Checkpoints::from_phases(&workflow.phases),
            &workflow.artifacts(),
            now,
        );

        let text = match state.to_pretty_string() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %shown, error = %e, "Failed to serialize state document");
                return false;
            }
        };
        match fs.write(&path, &text).await {
            Ok(()) => {
                tracing::info!(path = %shown, phase = %workflow.current_phase, "Synced to state document");
                true
            }
            Err(e) => {
                tracing::warn!(path = %shown, error = %e, "Failed to write state document");
                false
            }
        }
    }
}

/// Project name for a new scaffold: the directory's last component.
fn project_name(project_path: &Path) -> String {
    project_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "project".to_string())
}
