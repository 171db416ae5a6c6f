use std::path::PathBuf;

/// Command-line overrides, highest precedence.
///
/// `None` leaves the file or default value in place.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file; disables discovery.
    pub config_path: Option<PathBuf>,
    pub verbose: Option<bool>,
    pub store_path: Option<PathBuf>,
    pub state_file: Option<String>,
    pub strict_status_transitions: Option<bool>,
}
