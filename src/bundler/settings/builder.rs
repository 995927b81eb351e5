//! Builder for constructing Settings.

use super::{
    BuildSettings, PackageSettings, PackagingSettings, Settings, SigningSettings, ToolSettings,
    VersionSettings,
};
use crate::bundler::error::{ConfigError, Context};
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// Every section defaults to the product's standard layout; only the
/// repository root is required.
///
/// # Examples
///
/// ```
/// use release_builder::bundler::{PackageSettings, SettingsBuilder};
///
/// # fn example() -> release_builder::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .repo_root(".")
///     .package_settings(PackageSettings {
///         product_name: "product".into(),
///         ..Default::default()
///     })
///     .build()?;
/// assert_eq!(settings.product_name(), "product");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    repo_root: Option<PathBuf>,
    package: PackageSettings,
    version: VersionSettings,
    build: BuildSettings,
    signing: SigningSettings,
    packaging: PackagingSettings,
    tools: ToolSettings,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the repository root.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn repo_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.repo_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the product identity.
    pub fn package_settings(mut self, settings: PackageSettings) -> Self {
        self.package = settings;
        self
    }

    /// Sets the version source.
    pub fn version_settings(mut self, settings: VersionSettings) -> Self {
        self.version = settings;
        self
    }

    /// Sets the build configuration.
    pub fn build_settings(mut self, settings: BuildSettings) -> Self {
        self.build = settings;
        self
    }

    /// Sets the signing configuration.
    pub fn signing_settings(mut self, settings: SigningSettings) -> Self {
        self.signing = settings;
        self
    }

    /// Sets the packaging configuration.
    pub fn packaging_settings(mut self, settings: PackagingSettings) -> Self {
        self.packaging = settings;
        self
    }

    /// Sets the external tools.
    pub fn tool_settings(mut self, settings: ToolSettings) -> Self {
        self.tools = settings;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// - `repo_root` is missing
    /// - no architecture is configured
    /// - the product or timestamp URL does not parse
    pub fn build(mut self) -> crate::bundler::Result<Settings> {
        let repo_root = self.repo_root.context("repo_root is required")?;

        if self.build.architectures.is_empty() {
            return Err(ConfigError::NoArchitectures.into());
        }
        // Keep the configured order but build each architecture once.
        let mut seen = Vec::with_capacity(self.build.architectures.len());
        self.build.architectures.retain(|arch| {
            if seen.contains(arch) {
                false
            } else {
                seen.push(*arch);
                true
            }
        });

        validate_url("product.url", &self.package.url)?;
        validate_url("signing.timestamp_url", &self.signing.timestamp_url)?;

        if self
            .packaging
            .installer_qualifier
            .as_deref()
            .is_some_and(str::is_empty)
        {
            self.packaging.installer_qualifier = None;
        }

        Ok(Settings::new(
            repo_root,
            self.package,
            self.version,
            self.build,
            self.signing,
            self.packaging,
            self.tools,
        ))
    }
}

fn validate_url(field: &'static str, value: &str) -> crate::bundler::Result<()> {
    url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}
