//! Release builder for the Windows browser extension.
//!
//! This library drives the release of the extension from a source checkout:
//! - version resolution from the version header and version control
//! - per-architecture builds and code signing
//! - per-architecture installer packages
//! - the cross-architecture bundle and its separately signed engine
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;
pub mod source;

// Re-export commonly used types
pub use error::{CliError, ReleaseError, Result};
