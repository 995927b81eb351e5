//! Release pipeline for the Windows browser extension.
//!
//! Takes a source checkout to a signed, distributable bundle: per-architecture
//! binaries, per-architecture installer packages and one bundle executable
//! whose embedded engine is signed separately.
//!
//! # Module Organization
//!
//! - [`settings`] - resolved configuration and artifact paths
//! - [`process`] - external tool invocation, real and recorded
//! - [`builder`] - pipeline orchestration, signing, checksums, manifest
//! - [`platform`] - the Windows build and packaging stages
//! - [`artifact`] - produced files and their names
//! - [`error`] - error types

pub mod artifact;
pub mod builder;
pub mod error;
pub mod platform;
pub mod process;
pub mod settings;

pub use artifact::{Artifact, ArtifactRole};
pub use builder::{
    BundledArtifact, CodeSigner, Pipeline, ReleaseManifest, ReleaseOutcome, SigningKey,
};
pub use error::{ConfigError, Error, Result};
pub use settings::{
    Architecture, BuildSettings, DEFAULT_TOOL_TIMEOUT_SECS, PackageSettings, PackagingSettings,
    Settings, SettingsBuilder, SigningSettings, ToolSettings, VersionSettings,
};
