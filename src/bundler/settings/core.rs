//! Core Settings struct and implementations.

use super::{
    Architecture, BuildSettings, PackageSettings, PackagingSettings, SigningSettings,
    ToolSettings, VersionSettings,
};
use crate::bundler::artifact;
use crate::metadata::Version;
use std::path::{Path, PathBuf};

/// Main settings for a release run.
///
/// Central configuration for the pipeline, constructed via [`SettingsBuilder`].
/// Besides holding the configuration sections it knows the repository layout,
/// so every stage derives its input and output paths from one place.
///
/// # Examples
///
/// ```
/// use release_builder::bundler::{Architecture, SettingsBuilder};
/// use release_builder::metadata::Version;
///
/// # fn example() -> release_builder::bundler::Result<()> {
/// let settings = SettingsBuilder::new().repo_root("/src/product").build()?;
/// let version = Version::release("1.2")?;
/// assert!(settings
///     .installer_package_path(&version, Architecture::X64)
///     .ends_with("build/x64/adblockplusie-1.2-x64.msi"));
/// # Ok(())
/// # }
/// ```
///
/// [`SettingsBuilder`]: super::SettingsBuilder
#[derive(Clone, Debug)]
pub struct Settings {
    /// Root of the source checkout.
    repo_root: PathBuf,

    /// Product identity.
    package: PackageSettings,

    /// Version source.
    version: VersionSettings,

    /// Compiled-binary build.
    build: BuildSettings,

    /// Signing tool configuration.
    signing: SigningSettings,

    /// Installer packaging.
    packaging: PackagingSettings,

    /// External programs.
    tools: ToolSettings,
}

impl Settings {
    /// Returns the repository root.
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Returns the product name used in artifact names.
    pub fn product_name(&self) -> &str {
        &self.package.product_name
    }

    /// Returns the product identity settings.
    pub fn package(&self) -> &PackageSettings {
        &self.package
    }

    /// Returns the version source settings.
    pub fn version_settings(&self) -> &VersionSettings {
        &self.version
    }

    /// Returns the build settings.
    pub fn build_settings(&self) -> &BuildSettings {
        &self.build
    }

    /// Returns the signing settings.
    pub fn signing(&self) -> &SigningSettings {
        &self.signing
    }

    /// Returns the packaging settings.
    pub fn packaging(&self) -> &PackagingSettings {
        &self.packaging
    }

    /// Returns the tool settings.
    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    /// Packaging settings, for command line overrides.
    pub fn packaging_mut(&mut self) -> &mut PackagingSettings {
        &mut self.packaging
    }

    /// Tool settings, for command line overrides.
    pub fn tools_mut(&mut self) -> &mut ToolSettings {
        &mut self.tools
    }

    /// Architectures to build, in order.
    pub fn architectures(&self) -> &[Architecture] {
        &self.build.architectures
    }

    /// Header file holding the version macro.
    pub fn header_path(&self) -> PathBuf {
        self.repo_root.join(&self.version.header)
    }

    /// Solution generator script.
    pub fn solution_generator_path(&self) -> PathBuf {
        self.repo_root.join(&self.tools.solution_generator)
    }

    /// Top-level build output directory.
    pub fn build_dir(&self) -> PathBuf {
        self.repo_root.join("build")
    }

    /// Build directory of one architecture.
    pub fn arch_build_dir(&self, arch: Architecture) -> PathBuf {
        self.build_dir().join(arch.tag())
    }

    /// Generated solution of one architecture.
    pub fn solution_path(&self, arch: Architecture) -> PathBuf {
        self.arch_build_dir(arch).join(&self.build.solution)
    }

    /// Built shared library of one architecture.
    pub fn library_path(&self, arch: Architecture) -> PathBuf {
        self.arch_build_dir(arch)
            .join("Release")
            .join(format!("{}.dll", self.build.library_target))
    }

    /// Built engine executable of one architecture.
    pub fn executable_path(&self, arch: Architecture) -> PathBuf {
        self.arch_build_dir(arch)
            .join("Release")
            .join(format!("{}.exe", self.build.executable_target))
    }

    /// Directory the packaging driver and bundler run in.
    pub fn installer_dir(&self) -> PathBuf {
        self.repo_root.join(&self.packaging.installer_dir)
    }

    /// Bundle script passed to the bundler.
    pub fn bundle_script_path(&self) -> PathBuf {
        self.installer_dir().join(&self.packaging.bundle_script)
    }

    /// Installer package the packaging driver emits for one architecture.
    pub fn installer_package_path(&self, version: &Version, arch: Architecture) -> PathBuf {
        self.arch_build_dir(arch)
            .join(artifact::installer_package_name(
                self.product_name(),
                version,
                self.packaging.installer_qualifier.as_deref(),
                arch,
            ))
    }

    /// Cross-architecture bundle executable.
    pub fn bundle_path(&self, version: &Version) -> PathBuf {
        self.build_dir()
            .join(artifact::bundle_name(self.product_name(), version))
    }

    /// Side path the bundle engine is extracted to.
    pub fn engine_path(&self, version: &Version) -> PathBuf {
        self.build_dir().join(artifact::engine_name(version))
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    pub(super) fn new(
        repo_root: PathBuf,
        package: PackageSettings,
        version: VersionSettings,
        build: BuildSettings,
        signing: SigningSettings,
        packaging: PackagingSettings,
        tools: ToolSettings,
    ) -> Self {
        Self {
            repo_root,
            package,
            version,
            build,
            signing,
            packaging,
            tools,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::SettingsBuilder;
    use super::*;

    fn settings() -> Settings {
        SettingsBuilder::new()
            .repo_root("/repo")
            .package_settings(PackageSettings {
                product_name: "product".into(),
                ..Default::default()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn derives_binary_paths_per_architecture() {
        let settings = settings();
        assert_eq!(
            settings.library_path(Architecture::Ia32),
            Path::new("/repo/build/ia32/Release/AdblockPlus.dll")
        );
        assert_eq!(
            settings.executable_path(Architecture::X64),
            Path::new("/repo/build/x64/Release/AdblockPlusEngine.exe")
        );
        assert_eq!(
            settings.solution_path(Architecture::X64),
            Path::new("/repo/build/x64/adblockplus.sln")
        );
    }

    #[test]
    fn derives_installer_paths_from_version() {
        let settings = settings();
        let version = Version::release("1.2.123").unwrap();
        assert_eq!(
            settings.installer_package_path(&version, Architecture::Ia32),
            Path::new("/repo/build/ia32/product-1.2.123-ia32.msi")
        );
        assert_eq!(
            settings.bundle_path(&version),
            Path::new("/repo/build/product-1.2.123.exe")
        );
        assert_eq!(
            settings.engine_path(&version),
            Path::new("/repo/build/engine-1.2.123.exe")
        );
        assert_eq!(
            settings.bundle_script_path(),
            Path::new("/repo/installer/src/innosetup-exe/64BitTwoArch.iss")
        );
    }
}
