//! External tool locations and version source settings.

use crate::source::Vcs;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-invocation timeout (one hour).
///
/// Full solution builds of both architectures are the slowest step.
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 3600;

/// Programs invoked by the pipeline.
///
/// Each entry is a program name resolved through `PATH` or an absolute path.
/// The solution generator is resolved relative to the repository root.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Solution generator script, relative to the repository root.
    pub solution_generator: PathBuf,

    /// Compiled-language build tool.
    pub msbuild: String,

    /// Installer packaging driver.
    pub nmake: String,

    /// Bundle compiler.
    pub iscc: String,

    /// Bundle engine extraction/reinsertion tool.
    pub insignia: String,

    /// Mercurial client.
    pub hg: String,

    /// Timeout applied to every tool invocation, in seconds.
    pub timeout_secs: u64,
}

impl ToolSettings {
    /// Per-invocation timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            solution_generator: PathBuf::from("createsolution.bat"),
            msbuild: "msbuild".into(),
            nmake: "nmake".into(),
            iscc: "iscc".into(),
            insignia: "insignia".into(),
            hg: "hg".into(),
            timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

/// Where the version comes from.
///
/// ```toml
/// [version]
/// header = "src/shared/Version.h"
/// macro = "IEPLUGIN_VERSION"
/// vcs = "mercurial"
/// ```
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct VersionSettings {
    /// Header defining the version macro, relative to the repository root.
    pub header: PathBuf,

    /// Name of the version macro.
    #[serde(rename = "macro")]
    pub macro_name: String,

    /// Version control system used for dev build revisions.
    pub vcs: Vcs,
}

impl Default for VersionSettings {
    fn default() -> Self {
        Self {
            header: PathBuf::from("src/shared/Version.h"),
            macro_name: "IEPLUGIN_VERSION".into(),
            vcs: Vcs::Mercurial,
        }
    }
}
