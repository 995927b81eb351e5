//! Windows build and installer stages.
//!
//! # Module Organization
//!
//! - `solution` - project generation per version and build kind
//! - `msbuild` - per-architecture compiled build and binary signing
//! - `msi` - per-architecture installer packages
//! - `bundle` - cross-architecture bundle executable
//! - `insignia` - bundle engine extract/sign/reinsert/sign chain

pub mod bundle;
pub mod insignia;
pub mod msbuild;
pub mod msi;
pub mod solution;

pub use bundle::build_bundle;
pub use insignia::{BundleSigningChain, SignedBundle};
pub use msbuild::{ArchOutputs, build_all};
pub use msi::package_installers;
pub use solution::generate_solution;
