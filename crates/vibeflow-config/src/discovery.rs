use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use vibeflow_utils::error::ConfigError;

use super::{CliArgs, Config, ConfigSource};
use crate::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, HOME_ENV_VAR};

/// TOML configuration file structure. Every key is optional so attribution
/// can tell file values from defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    extraction: Option<TomlExtraction>,
    sync: Option<TomlSync>,
    workflow: Option<TomlWorkflow>,
    logging: Option<TomlLogging>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlExtraction {
    max_user_stories: Option<usize>,
    requirement_min_len: Option<usize>,
    requirement_max_len: Option<usize>,
    summary_max_chars: Option<usize>,
    summary_min_response_len: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlSync {
    state_file: Option<String>,
    schema_version: Option<String>,
    history_skills: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlWorkflow {
    strict_status_transitions: Option<bool>,
    store_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlLogging {
    verbose: Option<bool>,
}

/// Overwrite `config.<path>` with `value` if present and attribute `key` to `source`.
macro_rules! overlay {
    ($config:ident, $source:expr, $key:literal, $($path:ident).+ = $value:expr) => {
        if let Some(value) = $value {
            $config.$($path).+ = value;
            $config
                .source_attribution
                .insert($key.to_string(), $source.clone());
        }
    };
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory as the start of the upward search.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory.
    ///
    /// Resolution order for the file: `cli_args.config_path`, then
    /// `$VIBEFLOW_HOME/config.toml`, then the upward search.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let home = env::var_os(HOME_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::discover_with_home(start_dir, home.as_deref(), cli_args)
    }

    /// Discovery with an explicit home directory instead of the environment.
    pub fn discover_with_home(
        start_dir: &Path,
        home: Option<&Path>,
        cli_args: &CliArgs,
    ) -> Result<Self> {
        let mut config = Config::default();

        let config_path = match (&cli_args.config_path, home) {
            (Some(explicit), _) => {
                if !explicit.exists() {
                    return Err(ConfigError::NotFound {
                        path: explicit.display().to_string(),
                    }
                    .into());
                }
                Some(explicit.clone())
            }
            (None, Some(home)) => {
                let candidate = home.join(CONFIG_FILE_NAME);
                candidate.exists().then_some(candidate)
            }
            (None, None) => Self::discover_config_file_from(start_dir),
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "Loaded configuration file");
            let source = ConfigSource::ConfigFile(path.clone());

            if let Some(x) = file_config.extraction {
                overlay!(config, source, "max_user_stories", extraction.max_user_stories = x.max_user_stories);
                overlay!(config, source, "requirement_min_len", extraction.requirement_min_len = x.requirement_min_len);
                overlay!(config, source, "requirement_max_len", extraction.requirement_max_len = x.requirement_max_len);
                overlay!(config, source, "summary_max_chars", extraction.summary_max_chars = x.summary_max_chars);
                overlay!(config, source, "summary_min_response_len", extraction.summary_min_response_len = x.summary_min_response_len);
            }
            if let Some(s) = file_config.sync {
                overlay!(config, source, "state_file", sync.state_file = s.state_file);
                overlay!(config, source, "schema_version", sync.schema_version = s.schema_version);
                overlay!(config, source, "history_skills", sync.history_skills = s.history_skills);
            }
            if let Some(w) = file_config.workflow {
                overlay!(config, source, "strict_status_transitions", workflow.strict_status_transitions = w.strict_status_transitions);
                overlay!(config, source, "store_path", workflow.store_path = w.store_path.map(Some));
            }
            if let Some(l) = file_config.logging {
                overlay!(config, source, "verbose", logging.verbose = l.verbose);
            }
        }

        // CLI overrides everything
        let cli = ConfigSource::Cli;
        overlay!(config, cli, "verbose", logging.verbose = cli_args.verbose);
        overlay!(config, cli, "store_path", workflow.store_path = cli_args.store_path.clone().map(Some));
        overlay!(config, cli, "state_file", sync.state_file = cli_args.state_file.clone());
        overlay!(
            config,
            cli,
            "strict_status_transitions",
            workflow.strict_status_transitions = cli_args.strict_status_transitions
        );

        config.validate()?;
        Ok(config)
    }

    /// Walk up from `start_dir` looking for `.vibeflow/config.toml`, stopping
    /// at repository root markers (.git, .hg, .svn) or the filesystem root.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        for dir in start_dir.ancestors() {
            let config_path = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if dir.join(".git").exists() || dir.join(".hg").exists() || dir.join(".svn").exists() {
                break;
            }
        }
        None
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                anyhow::Error::new(ConfigError::InvalidFile(format!(
                    "{}: {}",
                    path.display(),
                    e.message()
                )))
            }),
            // raced with a delete: fall back to defaults
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )),
        }
    }

    /// Discover configuration with no CLI overrides.
    pub fn discover_from_env_and_fs() -> Result<Self> {
        Self::discover(&CliArgs::default())
    }
}
