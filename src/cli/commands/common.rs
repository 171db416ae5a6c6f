//! Common helper functions used across CLI commands
//!
//! Every command that changes state loads the store, mutates it and saves it
//! back before returning.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::{Config, EngineOptions, WorkflowStore};

/// A loaded workflow store and where it goes back to.
pub struct StoreSession {
    pub store: WorkflowStore,
    path: PathBuf,
}

impl StoreSession {
    /// Load the configured store, or start an empty one.
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.workflow.resolved_store_path();
        let store = WorkflowStore::load_or_default(&path, EngineOptions::from_config(config))?;
        Ok(Self { store, path })
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.path)?;
        Ok(())
    }

    /// Label for the project operations act on.
    #[must_use]
    pub fn project_label(&self) -> String {
        match self.store.active_project_id() {
            Some(id) => format!("'{id}'"),
            None => "(no active project)".to_string(),
        }
    }
}

/// `text` when given, otherwise all of stdin.
pub fn text_or_stdin(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Contents of `path` when given, otherwise all of stdin.
pub fn file_or_stdin(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => text_or_stdin(None),
    }
}

/// Pretty JSON for command output.
pub fn emit_json(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to emit JSON")
}
