//! Release pipeline orchestration.
//!
//! This module provides the [`Pipeline`] that runs every stage of a release
//! in order and collects the artifacts they produce.

use super::signing::{CodeSigner, SigningKey};
use crate::bundler::artifact::{Artifact, ArtifactRole};
use crate::bundler::platform::windows;
use crate::bundler::process::{Invoker, ToolRunner};
use crate::bundler::{Result, Settings};
use crate::metadata::{self, BuildKind, Version};
use tokio_util::sync::CancellationToken;

/// What a finished run produced.
#[derive(Clone, Debug)]
pub struct ReleaseOutcome {
    /// Resolved version
    pub version: Version,
    /// Build kind of the run
    pub build_kind: BuildKind,
    /// Produced artifacts, in the order they were created
    pub artifacts: Vec<Artifact>,
}

impl ReleaseOutcome {
    /// Artifacts with the given role.
    pub fn artifacts_with_role(&self, role: ArtifactRole) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(move |a| a.role() == role)
    }
}

/// Runs a release from a source checkout.
///
/// Stages run strictly one after another; each one must succeed before the
/// next starts:
///
/// 1. resolve the version
/// 2. generate solutions
/// 3. build and sign each architecture
/// 4. package and sign installer packages
/// 5. build the bundle
/// 6. extract, sign, reinsert the engine and sign the bundle
///
/// # Examples
///
/// ```no_run
/// use release_builder::bundler::{Pipeline, SettingsBuilder, SigningKey};
/// use release_builder::bundler::process::SystemRunner;
/// use release_builder::metadata::BuildKind;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> release_builder::bundler::Result<()> {
/// let settings = SettingsBuilder::new().repo_root(".").build()?;
/// let cancel = CancellationToken::new();
/// let runner = SystemRunner::new(Duration::from_secs(3600), cancel.clone());
/// let pipeline = Pipeline::new(
///     settings,
///     BuildKind::Release,
///     SigningKey::from_existing("release.pfx")?,
///     runner,
///     cancel,
/// );
/// let outcome = pipeline.run().await?;
/// println!("Released {}", outcome.version);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<R> {
    settings: Settings,
    build_kind: BuildKind,
    signer: CodeSigner,
    invoker: Invoker<R>,
}

impl<R> std::fmt::Debug for Pipeline<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("settings", &self.settings)
            .field("build_kind", &self.build_kind)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl<R: ToolRunner> Pipeline<R> {
    /// Creates a pipeline for one run.
    pub fn new(
        settings: Settings,
        build_kind: BuildKind,
        key: SigningKey,
        runner: R,
        cancel: CancellationToken,
    ) -> Self {
        let signer = CodeSigner::new(&settings, key);
        Self {
            settings,
            build_kind,
            signer,
            invoker: Invoker::new(runner, cancel),
        }
    }

    /// Returns the settings of this run.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the invoker, for inspecting the runner.
    pub fn invoker(&self) -> &Invoker<R> {
        &self.invoker
    }

    /// Runs every stage.
    pub async fn run(&self) -> Result<ReleaseOutcome> {
        let settings = &self.settings;
        let invoker = &self.invoker;

        let version = metadata::resolve(self.build_kind, settings, invoker).await?;
        log::info!("Releasing {} {} ({})", settings.product_name(), version, self.build_kind);

        windows::generate_solution(settings, &version, self.build_kind, invoker).await?;

        let mut artifacts = Vec::new();
        for built in windows::build_all(settings, &self.signer, invoker).await? {
            artifacts.extend(built.artifacts());
        }

        let packages = windows::package_installers(
            settings,
            &version,
            self.build_kind,
            &self.signer,
            invoker,
        )
        .await?;
        artifacts.extend(packages);

        let chain = windows::build_bundle(settings, &version, &self.signer, invoker).await?;
        let signed = chain.run().await?;
        log::info!("Signed bundle {}", signed.bundle.display());

        artifacts.push(Artifact::shared(ArtifactRole::EnginePayload, signed.engine));
        artifacts.push(Artifact::shared(ArtifactRole::Bundle, signed.bundle));

        Ok(ReleaseOutcome {
            version,
            build_kind: self.build_kind,
            artifacts,
        })
    }
}
