//! Per-architecture installer packages.
//!
//! The packaging driver reads the version from its environment and writes
//! one `.msi` per architecture. Under a dev build with tolerance enabled a
//! driver failure is logged and the packages that did get written are used.

use crate::bundler::artifact::{Artifact, ArtifactRole};
use crate::bundler::builder::CodeSigner;
use crate::bundler::error::{ConfigError, Error, Result};
use crate::bundler::process::{Invoker, ToolCommand, ToolRunner};
use crate::bundler::Settings;
use crate::metadata::{BuildKind, Version};

/// Environment variable the packaging driver and bundler read the version from.
pub const VERSION_ENV: &str = "VERSION";

/// Packaging driver command for all configured architectures.
pub fn driver_command(settings: &Settings, version: &Version) -> ToolCommand {
    ToolCommand::new("package installers", settings.tools().nmake.as_str())
        .arg("/A")
        .args(settings.architectures().iter().map(|arch| arch.tag()))
        .current_dir(settings.installer_dir())
        .env(VERSION_ENV, version.as_str())
}

/// Whether a packaging driver failure may be skipped for this run.
pub fn tolerates_failure(settings: &Settings, build_kind: BuildKind) -> bool {
    build_kind == BuildKind::DevBuild && settings.packaging().tolerate_devbuild_failure
}

/// Runs the packaging driver and signs the resulting packages together.
pub async fn package_installers<R: ToolRunner>(
    settings: &Settings,
    version: &Version,
    build_kind: BuildKind,
    signer: &CodeSigner,
    invoker: &Invoker<R>,
) -> Result<Vec<Artifact>> {
    log::info!("Packaging installers for {}", version);

    let expected: Vec<Artifact> = settings
        .architectures()
        .iter()
        .map(|&arch| {
            Artifact::for_arch(
                ArtifactRole::InstallerPackage,
                settings.installer_package_path(version, arch),
                arch,
            )
        })
        .collect();

    let packages = match invoker.invoke(&driver_command(settings, version)).await {
        Ok(_) => expected,
        Err(err @ Error::ToolFailed { .. }) if tolerates_failure(settings, build_kind) => {
            log::warn!("{}", err);
            log::warn!("Continuing dev build with the installer packages that exist");
            let existing: Vec<Artifact> = expected
                .into_iter()
                .filter(|artifact| artifact.path().is_file())
                .collect();
            if existing.is_empty() {
                return Err(ConfigError::NoArtifacts {
                    stage: "package installers".into(),
                }
                .into());
            }
            existing
        }
        Err(err) => return Err(err),
    };

    let paths: Vec<_> = packages.iter().map(Artifact::path).collect();
    signer.sign(invoker, "sign installers", &paths).await?;

    Ok(packages)
}
