//! Platform-specific build and packaging stages.

pub mod windows;
