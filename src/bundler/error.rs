//! Error types for release pipeline operations.
//!
//! Every failure carries the stage it happened in, so an operator can re-run
//! that stage after fixing the cause. Nothing in the pipeline retries.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Missing or malformed input. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The version header has no line defining the macro
    #[error("macro {macro_name} not found in file {}", file.display())]
    MacroNotFound {
        /// Macro that was searched for
        macro_name: String,
        /// Header that was scanned
        file: PathBuf,
    },

    /// The version literal is empty
    #[error("version is empty")]
    EmptyVersion,

    /// The version is not dot-separated digits, or has too many components
    #[error("invalid version {version:?}: {reason}")]
    InvalidVersion {
        /// Offending value
        version: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// The VCS identifier contained no digits
    #[error("version control identifier {identifier:?} contains no digits")]
    EmptyRevision {
        /// Raw identifier returned by the VCS
        identifier: String,
    },

    /// The signing key file does not exist
    #[error("signing key not found: {}", path.display())]
    MissingSigningKey {
        /// Path supplied on the command line
        path: PathBuf,
    },

    /// release.toml could not be read or parsed
    #[error("invalid release configuration {}: {reason}", path.display())]
    InvalidManifest {
        /// Configuration file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A configured URL does not parse
    #[error("invalid URL for {field}: {value:?} ({reason})")]
    InvalidUrl {
        /// Configuration key
        field: &'static str,
        /// Configured value
        value: String,
        /// Parser message
        reason: String,
    },

    /// No architectures configured
    #[error("at least one architecture must be configured")]
    NoArchitectures,

    /// A stage has nothing to operate on
    #[error("{stage}: no artifacts to process")]
    NoArtifacts {
        /// Stage that found nothing
        stage: String,
    },
}

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An external tool exited with an unexpected status
    #[error("{stage}: `{command}` failed with exit status {}", code.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
    ToolFailed {
        /// Pipeline stage
        stage: String,
        /// Rendered command line
        command: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
    },

    /// An external tool could not be started
    #[error("{stage}: failed to run `{command}`: {error}")]
    CommandFailed {
        /// Pipeline stage
        stage: String,
        /// Rendered command line
        command: String,
        /// Spawn or wait error
        #[source]
        error: std::io::Error,
    },

    /// An external tool ran past its timeout and was killed
    #[error("{stage}: `{command}` timed out after {secs}s")]
    Timeout {
        /// Pipeline stage
        stage: String,
        /// Rendered command line
        command: String,
        /// Configured timeout
        secs: u64,
    },

    /// The run was cancelled by the operator
    #[error("cancelled during {stage}")]
    Cancelled {
        /// Stage that was about to run or was running
        stage: String,
    },

    /// Filesystem error with the path it concerns
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        error: std::io::Error,
    },

    /// Git repository access failed
    #[error("git error: {0}")]
    Git(String),

    /// IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Exit status of the tool that caused this error.
    pub fn tool_exit_code(&self) -> Option<i32> {
        match self {
            Error::ToolFailed { code, .. } => *code,
            _ => None,
        }
    }
}

/// Turns a missing value into an error.
pub trait Context<T> {
    /// Fails with `context` when the value is absent.
    fn context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.into()))
    }
}

/// Attaches a path to IO errors.
pub trait ErrorExt<T> {
    /// Converts an IO error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}
