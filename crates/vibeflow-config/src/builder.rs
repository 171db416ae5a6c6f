use std::path::PathBuf;

use vibeflow_utils::error::VibeflowError;

use super::{Config, ConfigSource};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Use this when embedding the workflow core in a host application that
    /// should not depend on environment variables or config files.
    ///
    /// ```rust
    /// use vibeflow_config::Config;
    ///
    /// let config = Config::builder()
    ///     .max_user_stories(5)
    ///     .strict_status_transitions(true)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.extraction.max_user_stories, 5);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration.
///
/// Values set here are attributed to [`ConfigSource::Programmatic`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    fn mark(&mut self, key: &str) {
        self.config
            .source_attribution
            .insert(key.to_string(), ConfigSource::Programmatic);
    }

    #[must_use]
    pub fn max_user_stories(mut self, cap: usize) -> Self {
        self.config.extraction.max_user_stories = cap;
        self.mark("max_user_stories");
        self
    }

    /// Accepted length range for requirement bullet lines.
    #[must_use]
    pub fn requirement_len(mut self, min: usize, max: usize) -> Self {
        self.config.extraction.requirement_min_len = min;
        self.config.extraction.requirement_max_len = max;
        self.mark("requirement_min_len");
        self.mark("requirement_max_len");
        self
    }

    #[must_use]
    pub fn summary_max_chars(mut self, chars: usize) -> Self {
        self.config.extraction.summary_max_chars = chars;
        self.mark("summary_max_chars");
        self
    }

    #[must_use]
    pub fn summary_min_response_len(mut self, len: usize) -> Self {
        self.config.extraction.summary_min_response_len = len;
        self.mark("summary_min_response_len");
        self
    }

    #[must_use]
    pub fn state_file(mut self, path: impl Into<String>) -> Self {
        self.config.sync.state_file = path.into();
        self.mark("state_file");
        self
    }

    #[must_use]
    pub fn schema_version(mut self, version: impl Into<String>) -> Self {
        self.config.sync.schema_version = version.into();
        self.mark("schema_version");
        self
    }

    #[must_use]
    pub fn history_skills(mut self, count: usize) -> Self {
        self.config.sync.history_skills = count;
        self.mark("history_skills");
        self
    }

    #[must_use]
    pub fn strict_status_transitions(mut self, strict: bool) -> Self {
        self.config.workflow.strict_status_transitions = strict;
        self.mark("strict_status_transitions");
        self
    }

    #[must_use]
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.workflow.store_path = Some(path.into());
        self.mark("store_path");
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.logging.verbose = verbose;
        self.mark("verbose");
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<Config, VibeflowError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
