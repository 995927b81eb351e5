//! Windows build, signing and packaging settings.

use super::Architecture;
use std::path::PathBuf;

/// Authenticode signing configuration.
///
/// # Configuration
///
/// ```toml
/// [signing]
/// tool = "signtool"
/// timestamp_url = "http://www.startssl.com/timestamp"
/// ```
///
/// The key itself is never configured here; it is supplied per run on the
/// command line.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct SigningSettings {
    /// Signing tool program.
    ///
    /// Default: `signtool`
    pub tool: String,

    /// RFC 3161 timestamp authority (`signtool /tr`).
    pub timestamp_url: String,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            tool: "signtool".into(),
            timestamp_url: "http://www.startssl.com/timestamp".into(),
        }
    }
}

/// Compiled-binary build configuration.
///
/// Each architecture has its own generated solution at
/// `build/<arch>/<solution>`. Both targets are built in one invocation and
/// land in `build/<arch>/Release/`.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Solution file name inside each architecture's build directory.
    pub solution: String,

    /// Target producing the shared library (`<target>.dll`).
    pub library_target: String,

    /// Target producing the engine executable (`<target>.exe`).
    pub executable_target: String,

    /// Architectures to build, in order.
    pub architectures: Vec<Architecture>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            solution: "adblockplus.sln".into(),
            library_target: "AdblockPlus".into(),
            executable_target: "AdblockPlusEngine".into(),
            architectures: Architecture::ALL.to_vec(),
        }
    }
}

/// Installer packaging configuration.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct PackagingSettings {
    /// Directory holding the installer makefile, relative to the repository.
    pub installer_dir: PathBuf,

    /// Bundle script, relative to `installer_dir`.
    pub bundle_script: PathBuf,

    /// Optional qualifier inserted before the architecture tag of installer
    /// package names (`<product>-<version>-<qualifier>-<arch>.msi`).
    ///
    /// Default: None
    pub installer_qualifier: Option<String>,

    /// Keep going with the packages that exist when the packaging driver
    /// fails during a dev build.
    ///
    /// Default: true
    pub tolerate_devbuild_failure: bool,
}

impl Default for PackagingSettings {
    fn default() -> Self {
        Self {
            installer_dir: PathBuf::from("installer"),
            bundle_script: PathBuf::from("src/innosetup-exe/64BitTwoArch.iss"),
            installer_qualifier: None,
            tolerate_devbuild_failure: true,
        }
    }
}
