//! Release artifacts and their naming convention.
//!
//! Downstream tooling locates installers by name, so the names produced here
//! must not change: `<product>-<version>-<arch>.msi`,
//! `<product>-<version>.exe` and `engine-<version>.exe`.

use super::Architecture;
use crate::metadata::Version;
use std::path::{Path, PathBuf};

/// What an artifact is, which decides the stage that owns it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactRole {
    /// Shared library built per architecture
    Library,
    /// Engine executable built per architecture
    Executable,
    /// Per-architecture installer package
    InstallerPackage,
    /// Cross-architecture bundle executable
    Bundle,
    /// Engine extracted from the bundle
    EnginePayload,
}

impl std::fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactRole::Library => "library",
            ArtifactRole::Executable => "executable",
            ArtifactRole::InstallerPackage => "installer package",
            ArtifactRole::Bundle => "bundle",
            ArtifactRole::EnginePayload => "engine payload",
        };
        f.write_str(name)
    }
}

/// A file produced by the pipeline.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    role: ArtifactRole,
    path: PathBuf,
    arch: Option<Architecture>,
}

impl Artifact {
    /// Creates an artifact that belongs to one architecture.
    pub fn for_arch(role: ArtifactRole, path: PathBuf, arch: Architecture) -> Self {
        Self {
            role,
            path,
            arch: Some(arch),
        }
    }

    /// Creates an artifact shared by all architectures.
    pub fn shared(role: ArtifactRole, path: PathBuf) -> Self {
        Self {
            role,
            path,
            arch: None,
        }
    }

    /// Returns the artifact role.
    pub fn role(&self) -> ArtifactRole {
        self.role
    }

    /// Returns the artifact path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the architecture, if the artifact is architecture specific.
    pub fn arch(&self) -> Option<Architecture> {
        self.arch
    }
}

/// Installer package name for one architecture.
pub fn installer_package_name(
    product: &str,
    version: &Version,
    qualifier: Option<&str>,
    arch: Architecture,
) -> String {
    match qualifier {
        Some(qualifier) => format!("{product}-{version}-{qualifier}-{}.msi", arch.tag()),
        None => format!("{product}-{version}-{}.msi", arch.tag()),
    }
}

/// Bundle executable name.
pub fn bundle_name(product: &str, version: &Version) -> String {
    format!("{product}-{version}.exe")
}

/// Extracted engine name.
pub fn engine_name(version: &Version) -> String {
    format!("engine-{version}.exe")
}
