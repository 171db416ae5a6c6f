//! On-disk form of the workflow store
//!
//! One JSON file holds every project's workflow plus the active id. Writes
//! go through [`write_file_atomic`] so a crash never leaves a torn store.
//! Active skills are not persisted; they are re-derived on the next sync.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use vibeflow_utils::atomic_write::write_file_atomic;
use vibeflow_utils::error::{FsError, VibeflowError};
use vibeflow_utils::types::ProjectId;

use crate::options::EngineOptions;
use crate::store::WorkflowStore;
use crate::workflow::ProjectWorkflow;

/// Bumped when the file layout changes incompatibly.
pub const STORE_FILE_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreFileRef<'a> {
    version: u32,
    project_workflows: &'a BTreeMap<ProjectId, ProjectWorkflow>,
    active_project_id: Option<&'a str>,
    detached_workflow: &'a ProjectWorkflow,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    version: u32,
    #[serde(default)]
    project_workflows: BTreeMap<ProjectId, ProjectWorkflow>,
    #[serde(default)]
    active_project_id: Option<ProjectId>,
    #[serde(default)]
    detached_workflow: ProjectWorkflow,
}

impl WorkflowStore {
    /// Serialize every workflow and the active selection.
    pub fn to_json(&self) -> Result<String, VibeflowError> {
        let file = StoreFileRef {
            version: STORE_FILE_VERSION,
            project_workflows: &self.project_workflows,
            active_project_id: self.active_project_id.as_deref(),
            detached_workflow: &self.detached,
        };
        let mut text = serde_json::to_string_pretty(&file)?;
        text.push('\n');
        Ok(text)
    }

    /// Rebuild a store from [`to_json`](Self::to_json) output.
    ///
    /// `path` is only used in error messages.
    pub fn from_json(text: &str, path: &str, options: EngineOptions) -> Result<Self, VibeflowError> {
        let file: StoreFile = serde_json::from_str(text).map_err(|e| VibeflowError::Persist {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        if file.version > STORE_FILE_VERSION {
            return Err(VibeflowError::Persist {
                path: path.to_string(),
                reason: format!(
                    "store version {} is newer than supported version {STORE_FILE_VERSION}",
                    file.version
                ),
            });
        }

        let mut store = Self::new(options);
        store.project_workflows = file.project_workflows;
        store.detached = file.detached_workflow;
        if let Some(id) = &file.active_project_id {
            store.project_workflows.entry(id.clone()).or_default();
        }
        store.active_project_id = file.active_project_id;
        Ok(store)
    }

    /// Atomically write the store to `path`.
    pub fn save(&self, path: &Path) -> Result<(), VibeflowError> {
        let utf8 = Utf8Path::from_path(path).ok_or_else(|| FsError::NonUtf8Path {
            path: path.display().to_string(),
        })?;
        let text = self.to_json()?;
        write_file_atomic(utf8, &text).map_err(|e| VibeflowError::Persist {
            path: utf8.to_string(),
            reason: format!("{e:#}"),
        })?;
        tracing::debug!(path = %utf8, projects = self.project_workflows.len(), "Saved workflow store");
        Ok(())
    }

    pub fn load(path: &Path, options: EngineOptions) -> Result<Self, VibeflowError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| FsError::from_io(&display, e))?;
        Self::from_json(&text, &display, options)
    }

    /// Like [`load`](Self::load), but a missing file yields an empty store.
    pub fn load_or_default(path: &Path, options: EngineOptions) -> Result<Self, VibeflowError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text, &path.display().to_string(), options),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No workflow store yet, starting empty");
                Ok(Self::new(options))
            }
            Err(e) => Err(FsError::from_io(path.display().to_string(), e).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vibeflow_utils::context::{ContextField, ContextPatch};
    use vibeflow_utils::types::{Phase, PhaseStatus, SubPhase};

    fn populated() -> WorkflowStore {
        let mut store = WorkflowStore::default();
        store.init_project_workflow("alpha");
        store.complete_phase(Phase::Discovery, Some("DISCOVERY.xml".to_string()));
        store.set_current_sub_phase(Some(SubPhase::Segments));
        store.set_conversation_context(
            &ContextPatch::new().with_text(ContextField::ProjectIdea, "Time tracker"),
        );
        store.init_project_workflow("beta");
        store.set_phase(Phase::Design);
        store
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("workflows.json");
        let store = populated();
        store.save(&path).unwrap();

        let loaded = WorkflowStore::load(&path, EngineOptions::default()).unwrap();
        assert_eq!(loaded.active_project_id(), Some("beta"));
        assert_eq!(loaded.current_phase(), Phase::Design);
        assert_eq!(loaded.project_ids().collect::<Vec<_>>(), ["alpha", "beta"]);

        let alpha = loaded.project_workflow("alpha").unwrap();
        assert_eq!(alpha, store.project_workflow("alpha").unwrap());
        assert_eq!(alpha.phases[Phase::Discovery].status, PhaseStatus::Completed);
        assert_eq!(alpha.current_sub_phase, Some(SubPhase::Segments));
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store =
            WorkflowStore::load_or_default(&dir.path().join("none.json"), EngineOptions::default())
                .unwrap();
        assert_eq!(store.active_project_id(), None);
        assert_eq!(store.current_phase(), Phase::Welcome);

        let err = WorkflowStore::load(&dir.path().join("none.json"), EngineOptions::default())
            .unwrap_err();
        assert!(matches!(err, VibeflowError::Fs(FsError::NotFound { .. })));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let err = WorkflowStore::from_json("{ nope", "w.json", EngineOptions::default()).unwrap_err();
        assert!(matches!(err, VibeflowError::Persist { .. }));
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = WorkflowStore::from_json("{\"version\": 99}", "w.json", EngineOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("newer"));
    }

    #[test]
    fn test_active_id_without_entry_gets_fresh_workflow() {
        let store = WorkflowStore::from_json(
            r#"{"version": 1, "activeProjectId": "ghost"}"#,
            "w.json",
            EngineOptions::default(),
        )
        .unwrap();
        assert_eq!(store.active_project_id(), Some("ghost"));
        assert!(store.project_workflow("ghost").is_some());
    }

    #[test]
    fn test_camel_case_layout() {
        let json = populated().to_json().unwrap();
        assert!(json.contains("\"projectWorkflows\""));
        assert!(json.contains("\"activeProjectId\": \"beta\""));
        assert!(json.contains("\"currentPhase\": \"design\""));
        assert!(json.ends_with('\n'));
    }
}
