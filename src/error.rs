//! Top-level error types and process exit codes.

use crate::bundler::{ConfigError, Error};
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Exit status when the run timed out.
pub const EXIT_TIMEOUT: i32 = 124;
/// Exit status when the run was interrupted.
pub const EXIT_CANCELLED: i32 = 130;

/// Main error type for a release-builder invocation
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Pipeline errors
    #[error(transparent)]
    Bundler(#[from] Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Build kind is neither `release` nor `devbuild`
    #[error("Unknown build kind: {kind} (expected release or devbuild)")]
    UnknownBuildKind {
        /// Value given on the command line
        kind: String,
    },

    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl From<ConfigError> for ReleaseError {
    fn from(err: ConfigError) -> Self {
        ReleaseError::Bundler(err.into())
    }
}

impl ReleaseError {
    /// Process exit status for this error.
    ///
    /// A failing tool's own status is passed through; a tool that died
    /// without one maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReleaseError::Cli(CliError::UnknownBuildKind { .. }) => 2,
            ReleaseError::Cli(_) => 1,
            ReleaseError::Bundler(err) => match err {
                Error::ToolFailed { code, .. } => match code {
                    Some(code) if *code != 0 => *code,
                    _ => 1,
                },
                Error::Timeout { .. } => EXIT_TIMEOUT,
                Error::Cancelled { .. } => EXIT_CANCELLED,
                _ => 1,
            },
            ReleaseError::Io(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_failed(code: Option<i32>) -> Error {
        Error::ToolFailed {
            stage: "build x64".into(),
            command: "msbuild".into(),
            code,
        }
    }

    #[test]
    fn cli_errors_map_to_documented_codes() {
        let missing = ReleaseError::from(CliError::MissingArgument {
            argument: "<SIGNING_KEY_PATH>".into(),
        });
        let unknown = ReleaseError::from(CliError::UnknownBuildKind {
            kind: "nightly".into(),
        });
        assert_eq!(missing.exit_code(), 1);
        assert_eq!(unknown.exit_code(), 2);
    }

    #[test]
    fn tool_status_is_the_exit_code() {
        assert_eq!(ReleaseError::from(tool_failed(Some(5))).exit_code(), 5);
        assert_eq!(ReleaseError::from(tool_failed(None)).exit_code(), 1);
    }

    #[test]
    fn timeout_and_cancellation_codes() {
        let timeout = ReleaseError::from(Error::Timeout {
            stage: "build bundle".into(),
            command: "iscc".into(),
            secs: 1,
        });
        let cancelled = ReleaseError::from(Error::Cancelled {
            stage: "sign bundle".into(),
        });
        assert_eq!(timeout.exit_code(), EXIT_TIMEOUT);
        assert_eq!(cancelled.exit_code(), EXIT_CANCELLED);
    }

    #[test]
    fn configuration_errors_exit_one() {
        let err = ReleaseError::from(ConfigError::NoArchitectures);
        assert_eq!(err.exit_code(), 1);
    }
}
