use vibeflow_config::Config;
use vibeflow_extraction::ExtractionLimits;

/// Settings the store needs at runtime, resolved from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Refuse status updates that lower a phase's rank.
    pub strict_status_transitions: bool,
    pub extraction: ExtractionLimits,
    /// State document path relative to a project root.
    pub state_file: String,
    /// `version` written into a freshly scaffolded state document.
    pub schema_version: String,
    /// How many recent history entries show up in the active skills list.
    pub history_skills: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl EngineOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            strict_status_transitions: config.workflow.strict_status_transitions,
            extraction: ExtractionLimits::from(&config.extraction),
            state_file: config.sync.state_file.clone(),
            schema_version: config.sync.schema_version.clone(),
            history_skills: config.sync.history_skills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = Config::builder()
            .strict_status_transitions(true)
            .history_skills(4)
            .max_user_stories(3)
            .build()
            .unwrap();
        let options = EngineOptions::from_config(&config);
        assert!(options.strict_status_transitions);
        assert_eq!(options.history_skills, 4);
        assert_eq!(options.extraction.max_user_stories, 3);
        assert_eq!(options.state_file, ".genius/STATE.json");
    }
}
