use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Default cap on user stories mined from a specifications reply.
pub const DEFAULT_MAX_USER_STORIES: usize = 10;
/// Shortest bullet line accepted as a requirement.
pub const DEFAULT_REQUIREMENT_MIN_LEN: usize = 5;
/// Longest bullet line accepted as a requirement.
pub const DEFAULT_REQUIREMENT_MAX_LEN: usize = 200;
/// Characters kept when summarizing a specifications reply.
pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 800;
/// Replies shorter than this are never summarized.
pub const DEFAULT_SUMMARY_MIN_RESPONSE_LEN: usize = 500;
/// Location of the shared state document, relative to the project root.
pub const DEFAULT_STATE_FILE: &str = ".genius/STATE.json";
/// Schema version written into freshly scaffolded state documents.
pub const DEFAULT_SCHEMA_VERSION: &str = "6.2.0";
/// Entries of `skill_history` considered when deriving active skills.
pub const DEFAULT_HISTORY_SKILLS: usize = 2;

/// Configuration for vibeflow.
///
/// Built by [`Config::discover`], [`Config::discover_from`] or
/// [`Config::builder`]. Every value has a built-in default, so
/// `Config::default()` is always valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub extraction: ExtractionSettings,
    pub sync: SyncSettings,
    pub workflow: WorkflowSettings,
    pub logging: LoggingSettings,
    /// Where each setting came from (for status display).
    pub source_attribution: HashMap<String, ConfigSource>,
}

impl Default for Config {
    fn default() -> Self {
        let mut source_attribution = HashMap::new();
        for key in Self::KEYS {
            source_attribution.insert((*key).to_string(), ConfigSource::Defaults);
        }
        Self {
            extraction: ExtractionSettings::default(),
            sync: SyncSettings::default(),
            workflow: WorkflowSettings::default(),
            logging: LoggingSettings::default(),
            source_attribution,
        }
    }
}

impl Config {
    /// Every attributable setting key.
    pub const KEYS: &'static [&'static str] = &[
        "max_user_stories",
        "requirement_min_len",
        "requirement_max_len",
        "summary_max_chars",
        "summary_min_response_len",
        "state_file",
        "schema_version",
        "history_skills",
        "strict_status_transitions",
        "store_path",
        "verbose",
    ];

    /// Source of a setting; unknown keys report defaults.
    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .cloned()
            .unwrap_or(ConfigSource::Defaults)
    }
}

/// `[extraction]`: limits for heuristic extraction from model replies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionSettings {
    pub max_user_stories: usize,
    pub requirement_min_len: usize,
    pub requirement_max_len: usize,
    pub summary_max_chars: usize,
    pub summary_min_response_len: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_user_stories: DEFAULT_MAX_USER_STORIES,
            requirement_min_len: DEFAULT_REQUIREMENT_MIN_LEN,
            requirement_max_len: DEFAULT_REQUIREMENT_MAX_LEN,
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
            summary_min_response_len: DEFAULT_SUMMARY_MIN_RESPONSE_LEN,
        }
    }
}

/// `[sync]`: the shared state document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSettings {
    /// Relative to the project root.
    pub state_file: String,
    pub schema_version: String,
    pub history_skills: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            state_file: DEFAULT_STATE_FILE.to_string(),
            schema_version: DEFAULT_SCHEMA_VERSION.to_string(),
            history_skills: DEFAULT_HISTORY_SKILLS,
        }
    }
}

/// `[workflow]`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowSettings {
    /// Refuse status updates that lower a phase's status rank.
    pub strict_status_transitions: bool,
    /// Where the workflow store is persisted. `None` means the platform data dir.
    pub store_path: Option<PathBuf>,
}

impl WorkflowSettings {
    /// Configured store path, or `<data dir>/vibeflow/workflows.json`,
    /// or `.vibeflow/workflows.json` when the platform has no data dir.
    #[must_use]
    pub fn resolved_store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }
        match dirs::data_local_dir() {
            Some(dir) => dir.join("vibeflow").join("workflows.json"),
            None => PathBuf::from(crate::CONFIG_DIR_NAME).join("workflows.json"),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub verbose: bool,
}

/// Source of a configuration value for attribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    ConfigFile(PathBuf),
    Programmatic,
    Defaults,
}

impl ConfigSource {
    /// Stable short label (`cli`, `config`, `programmatic`, `default`).
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::ConfigFile(_) => "config",
            Self::Programmatic => "programmatic",
            Self::Defaults => "default",
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::ConfigFile(path) => write!(f, "config file ({})", path.display()),
            Self::Programmatic => write!(f, "programmatic"),
            Self::Defaults => write!(f, "defaults"),
        }
    }
}
