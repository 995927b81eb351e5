//! Release orchestration and coordination.
//!
//! This module provides the [`Pipeline`] that drives a release from a source
//! checkout to a signed bundle, plus the helpers around it.
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`manifest`] - JSON record of a finished run
//! - [`orchestrator`] - [`Pipeline`] and its stage ordering
//! - [`signing`] - signing key and [`CodeSigner`]
//! - [`tool_detection`] - external tool availability checking

pub mod checksum;
pub mod manifest;
pub mod orchestrator;
pub mod signing;
pub mod tool_detection;

pub use checksum::calculate_sha256;
pub use manifest::{BundledArtifact, ReleaseManifest};
pub use orchestrator::{Pipeline, ReleaseOutcome};
pub use signing::{CodeSigner, SigningKey};
pub use tool_detection::missing_tools;
