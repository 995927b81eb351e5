//! Project generation.

use crate::bundler::Settings;
use crate::bundler::error::Result;
use crate::bundler::process::{Invoker, ToolCommand, ToolRunner};
use crate::metadata::{BuildKind, Version};

/// Runs the solution generator for `version` and `build_kind`.
///
/// The generator writes `build/<arch>/<solution>` for every architecture.
pub async fn generate_solution<R: ToolRunner>(
    settings: &Settings,
    version: &Version,
    build_kind: BuildKind,
    invoker: &Invoker<R>,
) -> Result<()> {
    log::info!("Generating solutions for {} ({})", version, build_kind);

    let generator = settings.solution_generator_path();
    let command = ToolCommand::new("generate solution", generator.to_string_lossy())
        .arg(version.as_str())
        .arg(build_kind.as_str())
        .current_dir(settings.repo_root());
    invoker.invoke(&command).await?;
    Ok(())
}
