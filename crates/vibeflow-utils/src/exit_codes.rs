//! Exit code constants for the vibeflow CLI.
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 74 | `FILESYSTEM` | Project files could not be read or written |

/// Exit codes matching the documented exit code table.
///
/// ```rust
/// use vibeflow_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::FILESYSTEM, ExitCode::from_i32(74));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments, names or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Filesystem error - reading or writing project files failed (EX_IOERR)
    pub const FILESYSTEM: ExitCode = ExitCode(74);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::INTERNAL.as_i32(), 1);
        assert_eq!(ExitCode::CLI_ARGS.as_i32(), 2);
        assert_eq!(ExitCode::FILESYSTEM.as_i32(), 74);
    }

    #[test]
    fn test_conversions() {
        let code: ExitCode = 2.into();
        assert_eq!(code, ExitCode::CLI_ARGS);
        let raw: i32 = ExitCode::FILESYSTEM.into();
        assert_eq!(raw, 74);
        assert!(ExitCode::SUCCESS.is_success());
        assert!(!ExitCode::INTERNAL.is_success());
    }
}
