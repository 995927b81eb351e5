//! Authenticode signing of built artifacts.
//!
//! Every signable artifact goes through [`CodeSigner`], which always attaches
//! the same product identity and timestamp authority. Failures are returned
//! as they are: an unsigned artifact must stop the run.

use crate::bundler::Settings;
use crate::bundler::error::{ConfigError, Result};
use crate::bundler::process::{Invoker, ToolCommand, ToolRunner};
use std::path::{Path, PathBuf};

/// Private key / certificate used for every signature of a run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SigningKey(PathBuf);

impl SigningKey {
    /// Wraps a key path without checking it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Wraps a key path that must exist.
    pub fn from_existing(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(ConfigError::MissingSigningKey { path }.into());
        }
        Ok(Self(path))
    }

    /// Path to the key file.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Wrapper around the platform signing tool.
#[derive(Clone, Debug)]
pub struct CodeSigner {
    tool: String,
    display_name: String,
    url: String,
    timestamp_url: String,
    key: SigningKey,
}

impl CodeSigner {
    /// Creates a signer with the identity from `settings`.
    pub fn new(settings: &Settings, key: SigningKey) -> Self {
        Self {
            tool: settings.signing().tool.clone(),
            display_name: settings.package().display_name.clone(),
            url: settings.package().url.clone(),
            timestamp_url: settings.signing().timestamp_url.clone(),
            key,
        }
    }

    /// Returns the key this signer uses.
    pub fn key(&self) -> &SigningKey {
        &self.key
    }

    /// Builds the signing command for `paths`, in the given order.
    pub fn command<P: AsRef<Path>>(&self, stage: &str, paths: &[P]) -> Result<ToolCommand> {
        if paths.is_empty() {
            return Err(ConfigError::NoArtifacts {
                stage: stage.to_string(),
            }
            .into());
        }

        let mut command = ToolCommand::new(stage, self.tool.as_str())
            .args(["sign", "/v"])
            .arg("/d")
            .arg(self.display_name.as_str())
            .arg("/du")
            .arg(self.url.as_str())
            .arg("/f")
            .arg_path(self.key.path())
            .arg("/tr")
            .arg(self.timestamp_url.as_str());
        for path in paths {
            command = command.arg_path(path);
        }
        Ok(command)
    }

    /// Signs all `paths` in a single tool invocation.
    pub async fn sign<R, P>(&self, invoker: &Invoker<R>, stage: &str, paths: &[P]) -> Result<()>
    where
        R: ToolRunner,
        P: AsRef<Path>,
    {
        let command = self.command(stage, paths)?;
        log::info!("Signing {} file(s) [{}]", paths.len(), stage);
        invoker.invoke(&command).await?;
        Ok(())
    }
}
