use std::fmt;
use std::io;
use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// The workflow core itself is total: state-machine operations, extraction
/// and reconciliation degrade silently. `VibeflowError` surfaces at the
/// boundaries where a caller asked for something explicit: loading
/// configuration, persisting the store, parsing enum names from the command
/// line, or touching the filesystem.
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration and argument errors (including unknown names) |
/// | 74 | Filesystem and persistence errors |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use vibeflow_utils::error::VibeflowError;
///
/// fn handle_error(err: VibeflowError) {
///     eprintln!("{}", err.display_for_user());
///     std::process::exit(err.to_exit_code().as_i32());
/// }
/// ```
#[derive(Error, Debug)]
pub enum VibeflowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Filesystem error: {0}")]
    Fs(#[from] FsError),

    #[error("Invalid state document at {path}: {reason}")]
    StateDocument { path: String, reason: String },

    #[error("Failed to persist workflow store at {path}: {reason}")]
    Persist { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown phase: {0}")]
    UnknownPhase(String),

    #[error("Unknown phase status: {0}")]
    UnknownStatus(String),

    #[error("Unknown sub-phase: {0}")]
    UnknownSubPhase(String),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    FileSystem,
    StateDocument,
    Validation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::FileSystem => write!(f, "File System"),
            Self::StateDocument => write!(f, "State Document"),
            Self::Validation => write!(f, "Validation"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },

    #[error("Configuration validation failed: {error_count} errors")]
    ValidationFailed {
        errors: Vec<String>,
        error_count: usize,
    },
}

impl ConfigError {
    /// Build a `ValidationFailed` from collected messages.
    #[must_use]
    pub fn validation(errors: Vec<String>) -> Self {
        let error_count = errors.len();
        Self::ValidationFailed {
            errors,
            error_count,
        }
    }
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => {
                format!("Configuration file not found: {path}")
            }
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
            Self::ValidationFailed {
                errors,
                error_count: _,
            } => {
                format!(
                    "Configuration validation failed with {} errors: {}",
                    errors.len(),
                    errors.join(", ")
                )
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files must be valid TOML with optional [extraction], [sync], [workflow] and [logging] sections."
                    .to_string(),
            ),
            Self::InvalidValue { key, value: _ } => Some(format!(
                "The '{key}' configuration option has specific format requirements."
            )),
            Self::NotFound { path: _ } | Self::DiscoveryFailed { reason: _ } => Some(
                "vibeflow searches for .vibeflow/config.toml starting from the current directory upward."
                    .to_string(),
            ),
            Self::ValidationFailed { .. } => Some(
                "Validation checks length bounds, caps and the state file location.".to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Remove unknown sections or keys".to_string(),
            ],
            Self::InvalidValue { key, value: _ } => match key.as_str() {
                "state_file" => vec![
                    "Use a path relative to the project root, e.g. '.genius/STATE.json'"
                        .to_string(),
                    "Do not use '..' components".to_string(),
                ],
                "requirement_min_len" | "requirement_max_len" => vec![
                    "Make sure requirement_min_len is not greater than requirement_max_len"
                        .to_string(),
                ],
                _ => vec![
                    "Check the documentation for valid values for this option".to_string(),
                    "Remove the option to use the default value".to_string(),
                ],
            },
            Self::NotFound { path: _ } => vec![
                "Create .vibeflow/config.toml in your project root".to_string(),
                "Run without --config to use defaults".to_string(),
            ],
            Self::DiscoveryFailed { reason: _ } => vec![
                "Check file permissions in the current directory and parent directories"
                    .to_string(),
                "Set VIBEFLOW_HOME to point at a directory containing config.toml".to_string(),
            ],
            Self::ValidationFailed { .. } => vec![
                "Fix the listed values in .vibeflow/config.toml".to_string(),
                "Remove the offending keys to fall back to defaults".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Errors from the project filesystem collaborator
#[derive(Error, Debug)]
pub enum FsError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path { path: String },

    #[error("File is read-only: {path}")]
    ReadOnly { path: String },
}

impl FsError {
    /// Map an `io::Error` for `path`, folding `NotFound` into its own variant.
    #[must_use]
    pub fn from_io(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::NonUtf8Path { path }
            | Self::ReadOnly { path } => path,
        }
    }
}

impl UserFriendlyError for FsError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { path } => format!("File not found: {path}"),
            Self::Io { path, source } => format!("Could not access {path}: {source}"),
            Self::NonUtf8Path { path } => format!("Path is not valid UTF-8: {path}"),
            Self::ReadOnly { path } => format!("Cannot write read-only file: {path}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::NotFound { .. } => None,
            Self::Io { .. } | Self::ReadOnly { .. } => {
                Some("The project directory must be readable and writable.".to_string())
            }
            Self::NonUtf8Path { .. } => {
                Some("vibeflow only handles UTF-8 project paths.".to_string())
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { .. } => vec!["Check that the project path is correct".to_string()],
            Self::Io { .. } | Self::ReadOnly { .. } => vec![
                "Check file permissions in the project directory".to_string(),
                "Ensure there is enough disk space".to_string(),
            ],
            Self::NonUtf8Path { .. } => {
                vec!["Move the project to a path with UTF-8 characters only".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::FileSystem
    }
}

impl UserFriendlyError for VibeflowError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Fs(err) => err.user_message(),
            Self::StateDocument { path, reason } => {
                format!("State document {path} could not be used: {reason}")
            }
            Self::Persist { path, reason } => {
                format!("Workflow store could not be saved to {path}: {reason}")
            }
            Self::Io(err) => format!("I/O operation failed: {err}"),
            Self::Json(err) => format!("JSON data is malformed: {err}"),
            Self::UnknownPhase(name) => format!("'{name}' is not a known phase"),
            Self::UnknownStatus(name) => format!("'{name}' is not a known phase status"),
            Self::UnknownSubPhase(name) => format!("'{name}' is not a known sub-phase"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Fs(err) => err.context(),
            Self::StateDocument { .. } => Some(
                "The state document is shared with an external tool and must be a JSON object."
                    .to_string(),
            ),
            Self::Persist { .. } | Self::Io(_) => None,
            Self::Json(_) => Some("The workflow store file is written as JSON.".to_string()),
            Self::UnknownPhase(_) => Some(
                "Phases are: welcome, discovery, market-analysis, specifications, design, architecture, execution, qa, deployment."
                    .to_string(),
            ),
            Self::UnknownStatus(_) => Some(
                "Statuses are: pending, in_progress, awaiting_approval, approved, completed."
                    .to_string(),
            ),
            Self::UnknownSubPhase(_) => Some(
                "Sub-phases exist for discovery, market-analysis, design and architecture."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Fs(err) => err.suggestions(),
            Self::StateDocument { .. } => vec![
                "Inspect the file for syntax errors".to_string(),
                "Delete it to let vibeflow write a fresh scaffold".to_string(),
            ],
            Self::Persist { .. } | Self::Io(_) => vec![
                "Check file permissions and available disk space".to_string(),
            ],
            Self::Json(_) => vec![
                "Remove the corrupted store file to start from an empty store".to_string(),
            ],
            Self::UnknownPhase(_) | Self::UnknownStatus(_) | Self::UnknownSubPhase(_) => {
                vec!["Run 'vibeflow status' to see valid values".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Fs(_) | Self::Persist { .. } | Self::Io(_) => ErrorCategory::FileSystem,
            Self::StateDocument { .. } | Self::Json(_) => ErrorCategory::StateDocument,
            Self::UnknownPhase(_) | Self::UnknownStatus(_) | Self::UnknownSubPhase(_) => {
                ErrorCategory::Validation
            }
        }
    }
}

impl VibeflowError {
    /// Get a user-friendly error message with context and actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_)
            | Self::UnknownPhase(_)
            | Self::UnknownStatus(_)
            | Self::UnknownSubPhase(_) => ExitCode::CLI_ARGS,
            Self::Fs(_) | Self::Persist { .. } | Self::Io(_) => ExitCode::FILESYSTEM,
            Self::StateDocument { .. } | Self::Json(_) => ExitCode::INTERNAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::ExitCode;

    #[test]
    fn test_display_for_user_includes_suggestions() {
        let err = VibeflowError::UnknownPhase("build".to_string());
        let text = err.display_for_user();
        assert!(text.starts_with("Error: 'build' is not a known phase"));
        assert!(text.contains("Context: Phases are:"));
        assert!(text.contains("vibeflow status"));
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(
            VibeflowError::Config(ConfigError::InvalidFile("x".into())).to_exit_code(),
            ExitCode::CLI_ARGS
        );
        assert_eq!(
            VibeflowError::UnknownStatus("done".into()).to_exit_code(),
            ExitCode::CLI_ARGS
        );
        assert_eq!(
            VibeflowError::Fs(FsError::NotFound { path: "a".into() }).to_exit_code(),
            ExitCode::FILESYSTEM
        );
        assert_eq!(
            VibeflowError::StateDocument {
                path: "p".into(),
                reason: "r".into()
            }
            .to_exit_code(),
            ExitCode::INTERNAL
        );
    }

    #[test]
    fn test_fs_error_from_io_folds_not_found() {
        let err = FsError::from_io("x.txt", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, FsError::NotFound { .. }));
        assert_eq!(err.path(), "x.txt");

        let err = FsError::from_io("y.txt", io::Error::other("boom"));
        assert!(matches!(err, FsError::Io { .. }));
    }

    #[test]
    fn test_config_validation_counts_errors() {
        let err = ConfigError::validation(vec!["a".into(), "b".into()]);
        assert!(err.to_string().contains("2 errors"));
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_message().contains("a, b"));
    }
}
