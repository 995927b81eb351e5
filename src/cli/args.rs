//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap. Parsing never exits
//! the process by itself; [`super::run`] maps failures to exit codes.

use crate::bundler::Settings;
use crate::error::CliError;
use crate::metadata::{BuildKind, CONFIG_FILE_NAME};
use clap::Parser;
use std::path::PathBuf;

/// Builds and signs the Windows installers and bundle
#[derive(Parser, Debug)]
#[command(
    name = "release-builder",
    version,
    about = "Builds and signs the Windows installers and bundle",
    long_about = "Builds every architecture, packages per-architecture installers, builds the \
bundle executable and signs the bundle engine and the bundle.

Usage:
  release-builder release /keys/release.pfx
  release-builder --repo ../checkout devbuild /keys/dev.pfx

Exit codes: 0 success, 1 missing arguments or configuration error, 2 unknown build \
kind, otherwise the failing tool's exit status (124 timeout, 130 interrupted)."
)]
pub struct Args {
    /// Build kind: release or devbuild
    #[arg(value_name = "BUILD_KIND")]
    pub build_kind: String,

    /// Code signing key used for every signing step
    #[arg(value_name = "SIGNING_KEY_PATH")]
    pub signing_key: PathBuf,

    /// Repository root
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Release configuration (defaults to release.toml in the repository root)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Per-tool timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Fail dev builds when installer packaging fails
    #[arg(long)]
    pub strict_devbuild: bool,

    /// Write a JSON release manifest to this path
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse the given arguments without exiting on error
    pub fn try_parse_from_iter<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Validated build kind.
    pub fn build_kind(&self) -> Result<BuildKind, CliError> {
        BuildKind::parse(&self.build_kind).ok_or_else(|| CliError::UnknownBuildKind {
            kind: self.build_kind.clone(),
        })
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        self.build_kind()?;
        if self.timeout_secs == Some(0) {
            return Err(CliError::InvalidArguments {
                reason: "--timeout-secs must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Configuration file to load, and whether it must exist.
    pub fn config_path(&self, repo_root: &std::path::Path) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (repo_root.join(CONFIG_FILE_NAME), false),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
    strict_devbuild: bool,
    timeout_secs: Option<u64>,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(!args.quiet, args.quiet),
            strict_devbuild: args.strict_devbuild,
            timeout_secs: args.timeout_secs,
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Applies command line overrides to loaded settings.
    pub fn apply(&self, settings: &mut Settings) {
        if self.strict_devbuild {
            settings.packaging_mut().tolerate_devbuild_failure = false;
        }
        if let Some(secs) = self.timeout_secs {
            settings.tools_mut().timeout_secs = secs;
        }
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> Self {
        use clap::error::{ContextKind, ContextValue, ErrorKind};
        match err.kind() {
            ErrorKind::MissingRequiredArgument => {
                let argument = match err.get(ContextKind::InvalidArg) {
                    Some(ContextValue::Strings(names)) => names.join(", "),
                    Some(ContextValue::String(name)) => name.clone(),
                    _ => "arguments".to_string(),
                };
                CliError::MissingArgument { argument }
            }
            _ => CliError::InvalidArguments {
                reason: err.to_string().trim().to_string(),
            },
        }
    }
}
