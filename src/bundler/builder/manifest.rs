//! Machine-readable record of a finished release run.

use super::checksum::calculate_sha256;
use super::orchestrator::ReleaseOutcome;
use crate::bundler::artifact::ArtifactRole;
use crate::bundler::error::{ErrorExt, Result};
use crate::bundler::Architecture;
use crate::metadata::{BuildKind, Version};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// One produced file with its size and checksum.
#[derive(Clone, Debug, serde::Serialize)]
pub struct BundledArtifact {
    /// What the file is
    pub role: ArtifactRole,
    /// Architecture, for per-architecture files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<Architecture>,
    /// Location on disk
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Hex-encoded SHA-256
    pub sha256: String,
}

/// Summary of a release run, written as JSON.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ReleaseManifest {
    /// Product name used in artifact names
    pub product: String,
    /// Resolved version
    pub version: Version,
    /// Build kind of the run
    pub build_kind: BuildKind,
    /// Completion time
    pub built_at: DateTime<Utc>,
    /// Produced files that exist on disk
    pub artifacts: Vec<BundledArtifact>,
}

impl ReleaseManifest {
    /// Measures every artifact of `outcome` that exists on disk.
    pub async fn collect(product: &str, outcome: &ReleaseOutcome) -> Result<Self> {
        let mut artifacts = Vec::with_capacity(outcome.artifacts.len());

        for artifact in &outcome.artifacts {
            let path = artifact.path();
            let metadata = match tokio::fs::metadata(path).await {
                Ok(metadata) if metadata.is_file() => metadata,
                _ => {
                    log::debug!("Skipping {} (not on disk)", path.display());
                    continue;
                }
            };
            artifacts.push(BundledArtifact {
                role: artifact.role(),
                arch: artifact.arch(),
                path: path.to_path_buf(),
                size: metadata.len(),
                sha256: calculate_sha256(path).await?,
            });
        }

        Ok(Self {
            product: product.to_string(),
            version: outcome.version.clone(),
            build_kind: outcome.build_kind,
            built_at: Utc::now(),
            artifacts,
        })
    }

    /// Writes the manifest as pretty-printed JSON.
    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating manifest directory", parent)?;
        }
        tokio::fs::write(path, json)
            .await
            .fs_context("writing release manifest", path)?;
        Ok(())
    }
}
