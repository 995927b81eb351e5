//! Configuration structures for release runs.
//!
//! This module provides the configuration sections read from `release.toml`
//! (product identity, version source, build, signing, packaging, tools) and
//! the [`Settings`] value every pipeline stage reads its paths from.

mod arch;
mod builder;
mod core;
mod package;
mod tools;
mod windows;

// Re-export all public types
pub use arch::Architecture;
pub use builder::SettingsBuilder;
pub use core::Settings;
pub use package::PackageSettings;
pub use tools::{DEFAULT_TOOL_TIMEOUT_SECS, ToolSettings, VersionSettings};
pub use windows::{BuildSettings, PackagingSettings, SigningSettings};
