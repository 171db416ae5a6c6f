use std::collections::BTreeMap;

use super::Config;

impl Config {
    /// Effective configuration as `key -> (value, source label)`.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let x = &self.extraction;
        let values: [(&str, String); 11] = [
            ("max_user_stories", x.max_user_stories.to_string()),
            ("requirement_min_len", x.requirement_min_len.to_string()),
            ("requirement_max_len", x.requirement_max_len.to_string()),
            ("summary_max_chars", x.summary_max_chars.to_string()),
            (
                "summary_min_response_len",
                x.summary_min_response_len.to_string(),
            ),
            ("state_file", self.sync.state_file.clone()),
            ("schema_version", self.sync.schema_version.clone()),
            ("history_skills", self.sync.history_skills.to_string()),
            (
                "strict_status_transitions",
                self.workflow.strict_status_transitions.to_string(),
            ),
            (
                "store_path",
                self.workflow.resolved_store_path().display().to_string(),
            ),
            ("verbose", self.logging.verbose.to_string()),
        ];

        values
            .into_iter()
            .map(|(key, value)| {
                let source = self.source_of(key).label().to_string();
                (key.to_string(), (value, source))
            })
            .collect()
    }
}
