use std::path::{Component, Path};

use vibeflow_utils::error::{ConfigError, VibeflowError};

use super::Config;

fn invalid(key: &str, value: impl Into<String>) -> String {
    format!("{key}: {}", value.into())
}

impl Config {
    /// Validate configuration values.
    ///
    /// All problems are collected; a single problem is reported as
    /// `InvalidValue`, several as `ValidationFailed`.
    pub fn validate(&self) -> Result<(), VibeflowError> {
        let mut problems: Vec<(&'static str, String)> = Vec::new();
        let x = &self.extraction;

        if x.max_user_stories == 0 {
            problems.push(("max_user_stories", "must be greater than 0".into()));
        }
        if x.requirement_max_len == 0 {
            problems.push(("requirement_max_len", "must be greater than 0".into()));
        }
        if x.requirement_min_len > x.requirement_max_len {
            problems.push((
                "requirement_min_len",
                format!(
                    "{} exceeds requirement_max_len {}",
                    x.requirement_min_len, x.requirement_max_len
                ),
            ));
        }
        if x.summary_max_chars == 0 {
            problems.push(("summary_max_chars", "must be greater than 0".into()));
        }

        let state_file = Path::new(&self.sync.state_file);
        if self.sync.state_file.trim().is_empty() {
            problems.push(("state_file", "must not be empty".into()));
        } else if state_file.is_absolute() || state_file.has_root() {
            problems.push((
                "state_file",
                format!("'{}' must be relative to the project root", self.sync.state_file),
            ));
        } else if state_file
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            problems.push((
                "state_file",
                format!("'{}' must not escape the project root", self.sync.state_file),
            ));
        }
        if self.sync.schema_version.trim().is_empty() {
            problems.push(("schema_version", "must not be empty".into()));
        }

        match problems.len() {
            0 => Ok(()),
            1 => {
                let (key, value) = problems.remove(0);
                Err(VibeflowError::Config(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value,
                }))
            }
            _ => Err(VibeflowError::Config(ConfigError::validation(
                problems
                    .into_iter()
                    .map(|(key, value)| invalid(key, value))
                    .collect(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_story_cap_rejected() {
        let mut config = Config::default();
        config.extraction.max_user_stories = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            VibeflowError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "max_user_stories"
        ));
    }

    #[test]
    fn test_state_file_must_stay_inside_project() {
        let mut config = Config::default();
        config.sync.state_file = "../elsewhere/STATE.json".into();
        assert!(config.validate().is_err());

        config.sync.state_file = "/abs/STATE.json".into();
        assert!(config.validate().is_err());

        config.sync.state_file = "state/STATE.json".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_multiple_problems_are_collected() {
        let mut config = Config::default();
        config.extraction.summary_max_chars = 0;
        config.sync.schema_version = " ".into();
        match config.validate().unwrap_err() {
            VibeflowError::Config(ConfigError::ValidationFailed { errors, error_count }) => {
                assert_eq!(error_count, 2);
                assert!(errors[0].starts_with("summary_max_chars"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
