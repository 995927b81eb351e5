//! Cross-architecture bundle executable.

use super::insignia::{BundleBuilt, BundleSigningChain};
use super::msi::VERSION_ENV;
use crate::bundler::builder::CodeSigner;
use crate::bundler::error::Result;
use crate::bundler::process::{Invoker, ToolCommand, ToolRunner};
use crate::bundler::Settings;
use crate::metadata::Version;

/// Bundler command merging the installer packages into one executable.
pub fn bundler_command(settings: &Settings, version: &Version) -> ToolCommand {
    ToolCommand::new("build bundle", settings.tools().iscc.as_str())
        .arg("/A")
        .arg_path(settings.bundle_script_path())
        .arg(format!("/Dversion={version}"))
        .current_dir(settings.installer_dir())
        .env(VERSION_ENV, version.as_str())
}

/// Builds the bundle and returns the signing chain that must follow.
///
/// The bundle written here is unsigned; only the returned chain can finish it.
pub async fn build_bundle<'a, R: ToolRunner>(
    settings: &'a Settings,
    version: &Version,
    signer: &'a CodeSigner,
    invoker: &'a Invoker<R>,
) -> Result<BundleSigningChain<'a, R, BundleBuilt>> {
    log::info!("Building bundle {}", settings.bundle_path(version).display());
    invoker.invoke(&bundler_command(settings, version)).await?;

    Ok(BundleSigningChain::new(
        invoker,
        signer,
        settings.tools().insignia.as_str(),
        settings.bundle_path(version),
        settings.engine_path(version),
    ))
}
