//! The `.genius/STATE.json` document
//!
//! The document is owned by an external tool. vibeflow reads its `phase`
//! and skill history, and writes back only `phase`, `checkpoints`,
//! `artifacts` and `project.updated_at`; every other key is carried through
//! untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use vibeflow_utils::error::VibeflowError;
use vibeflow_utils::types::Phase;

use crate::checkpoints::Checkpoints;
use crate::phase_map::{INITIAL_PHASE, genius_phase, workflow_phase};
use crate::skills::active_skills;

/// A parsed STATE.json object.
#[derive(Debug, Clone, PartialEq)]
pub struct GeniusState {
    root: Map<String, Value>,
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl GeniusState {
    /// Parse a document; anything other than a JSON object is rejected.
    ///
    /// `path` is used only for error messages.
    pub fn parse(text: &str, path: &str) -> Result<Self, VibeflowError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| VibeflowError::StateDocument {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(VibeflowError::StateDocument {
                path: path.to_string(),
                reason: format!("expected a JSON object, found {}", type_name(&other)),
            }),
        }
    }

    /// The document the external tool writes for a brand-new project.
    #[must_use]
    pub fn scaffold(project_name: &str, schema_version: &str, now: DateTime<Utc>) -> Self {
        let now = timestamp(now);
        let value = json!({
            "version": schema_version,
            "project": {
                "name": project_name,
                "created_at": now,
                "updated_at": now,
            },
            "phase": INITIAL_PHASE,
            "current_skill": null,
            "skill_history": [],
            "checkpoints": Checkpoints::default(),
            "tasks": {
                "total": 0,
                "completed": 0,
                "failed": 0,
                "skipped": 0,
                "current_task_id": null,
            },
            "artifacts": {},
            "git": {
                "enabled": false,
                "last_checkpoint": null,
                "checkpoints": [],
            },
            "errors": [],
            "warnings": [],
        });
        Self {
            root: serde_json::from_value(value).unwrap_or_default(),
        }
    }

    /// Raw `phase` string, if present.
    #[must_use]
    pub fn phase_name(&self) -> Option<&str> {
        self.root.get("phase").and_then(Value::as_str)
    }

    /// `phase` mapped onto the workflow; missing or unknown means welcome.
    #[must_use]
    pub fn workflow_phase(&self) -> Phase {
        self.phase_name().map_or(Phase::Welcome, workflow_phase)
    }

    #[must_use]
    pub fn current_skill(&self) -> Option<&str> {
        self.root
            .get("current_skill")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// `skill_history` entries as names, oldest first. Entries may be plain
    /// strings or objects with a `skill` key; anything else is skipped.
    #[must_use]
    pub fn skill_history(&self) -> Vec<&str> {
        let Some(Value::Array(entries)) = self.root.get("skill_history") else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(name) => Some(name.as_str()),
                Value::Object(obj) => obj.get("skill").and_then(Value::as_str),
                _ => None,
            })
            .filter(|name| !name.trim().is_empty())
            .collect()
    }

    /// Current skill plus the most recent distinct history entries.
    #[must_use]
    pub fn active_skills(&self, history_limit: usize) -> Vec<String> {
        active_skills(self.current_skill(), &self.skill_history(), history_limit)
    }

    /// Stored checkpoints; missing or malformed flags read as unmet.
    #[must_use]
    pub fn checkpoints(&self) -> Checkpoints {
        self.root
            .get("checkpoints")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Overwrite the fields vibeflow owns.
    ///
    /// `artifacts` is keyed by workflow phase name. If `project` is not an
    /// object it is replaced by one holding only `updated_at`.
    pub fn apply_workflow(
        &mut self,
        phase: Phase,
        checkpoints: Checkpoints,
        artifacts: &BTreeMap<Phase, String>,
        now: DateTime<Utc>,
    ) {
        self.root
            .insert("phase".to_string(), Value::from(genius_phase(phase)));
        self.root.insert("checkpoints".to_string(), json!(checkpoints));

        let artifacts: Map<String, Value> = artifacts
            .iter()
            .map(|(phase, path)| (phase.as_str().to_string(), Value::from(path.as_str())))
            .collect();
        self.root
            .insert("artifacts".to_string(), Value::Object(artifacts));

        let updated_at = Value::from(timestamp(now));
        match self.root.get_mut("project") {
            Some(Value::Object(project)) => {
                project.insert("updated_at".to_string(), updated_at);
            }
            _ => {
                let mut project = Map::new();
                project.insert("updated_at".to_string(), updated_at);
                self.root
                    .insert("project".to_string(), Value::Object(project));
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    #[must_use]
    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Pretty JSON, two-space indented, newline terminated.
    pub fn to_pretty_string(&self) -> Result<String, VibeflowError> {
        let mut text = serde_json::to_string_pretty(&self.root)?;
        text.push('\n');
        Ok(text)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
