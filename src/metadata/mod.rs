//! Release configuration and version metadata.
//!
//! `release.toml` at the repository root describes the product, where its
//! version lives and which tools build it. The file is optional and every
//! key has a default, so a checkout with the standard layout needs none.

mod version;

pub use version::{BuildKind, Version, read_macro_value, resolve};

use crate::bundler::error::{ConfigError, Result};
use crate::bundler::{
    BuildSettings, PackageSettings, PackagingSettings, Settings, SettingsBuilder,
    SigningSettings, ToolSettings, VersionSettings,
};
use std::path::Path;

/// File name looked up in the repository root.
pub const CONFIG_FILE_NAME: &str = "release.toml";

/// Parsed `release.toml`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    /// `[product]`
    pub product: PackageSettings,
    /// `[version]`
    pub version: VersionSettings,
    /// `[build]`
    pub build: BuildSettings,
    /// `[signing]`
    pub signing: SigningSettings,
    /// `[packaging]`
    pub packaging: PackagingSettings,
    /// `[tools]`
    pub tools: ToolSettings,
}

impl ReleaseConfig {
    /// Builds pipeline settings rooted at `repo_root`.
    pub fn into_settings(self, repo_root: &Path) -> Result<Settings> {
        SettingsBuilder::new()
            .repo_root(repo_root)
            .package_settings(self.product)
            .version_settings(self.version)
            .build_settings(self.build)
            .signing_settings(self.signing)
            .packaging_settings(self.packaging)
            .tool_settings(self.tools)
            .build()
    }
}

/// Loads the configuration at `path`.
///
/// A missing file yields the defaults when `required` is false.
pub async fn load_config(path: &Path, required: bool) -> Result<ReleaseConfig> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            log::debug!("No {} found, using defaults", path.display());
            return Ok(ReleaseConfig::default());
        }
        Err(e) => {
            return Err(ConfigError::InvalidManifest {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into());
        }
    };

    toml::from_str(&content).map_err(|e| {
        ConfigError::InvalidManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}
