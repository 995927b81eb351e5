//! Command line interface for the release builder.
//!
//! This module parses arguments, loads the release configuration, runs the
//! pipeline and turns its outcome into operator output and an exit code.

mod args;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::bundler::builder::missing_tools;
use crate::bundler::process::SystemRunner;
use crate::bundler::{Pipeline, ReleaseManifest, SigningKey};
use crate::error::{CliError, EXIT_CANCELLED, ReleaseError, Result};
use crate::metadata;
use path_absolutize::Absolutize;
use std::ffi::OsString;
use std::future::Future;
use std::process;
use tokio_util::sync::CancellationToken;

/// Main CLI entry point. Returns the process exit code.
pub async fn run() -> i32 {
    run_from(std::env::args_os()).await
}

/// Runs with explicit arguments (the first one is the program name).
pub async fn run_from<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from_iter(args) {
        Ok(args) => args,
        Err(err) => {
            use clap::error::ErrorKind;
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => ReleaseError::from(CliError::from(err)).exit_code(),
            };
        }
    };

    let runtime = RuntimeConfig::from(&args);
    match execute(&args, &runtime).await {
        Ok(()) => 0,
        Err(err) => {
            log::debug!("Release failed: {:?}", err);
            let _ = runtime.output().error(&err.to_string());
            err.exit_code()
        }
    }
}

async fn execute(args: &Args, runtime: &RuntimeConfig) -> Result<()> {
    args.validate()?;
    let build_kind = args.build_kind()?;
    let output = runtime.output();

    let repo_root = args.repo.absolutize()?.into_owned();
    let (config_path, required) = args.config_path(&repo_root);
    let mut settings = metadata::load_config(&config_path, required)
        .await?
        .into_settings(&repo_root)?;
    runtime.apply(&mut settings);

    // Tools run from several working directories, so the key path must not be relative.
    let key = SigningKey::from_existing(args.signing_key.absolutize()?.into_owned())?;

    for program in missing_tools(&settings) {
        output.warn(&format!("{} was not found on PATH", program))?;
    }

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(watch_interrupts(
        tokio::signal::ctrl_c,
        cancel.clone(),
        || {
            process::exit(EXIT_CANCELLED);
        },
    ));

    let runner = SystemRunner::new(settings.tools().timeout(), cancel.clone());
    let pipeline = Pipeline::new(settings, build_kind, key, runner, cancel);
    let product = pipeline.settings().product_name().to_string();

    output.section(&format!("Releasing {} ({})", product, build_kind))?;
    output.verbose(&format!("Repository: {}", repo_root.display()))?;

    let outcome = pipeline.run().await;
    interrupt.abort();
    let outcome = outcome?;

    let manifest = ReleaseManifest::collect(&product, &outcome).await?;
    output.section("Artifacts")?;
    for artifact in &manifest.artifacts {
        output.progress(&format!("{} ({})", artifact.path.display(), artifact.role))?;
        output.indent(&format!("sha256 {}  {} bytes", artifact.sha256, artifact.size))?;
    }

    if let Some(path) = &args.manifest {
        manifest.write(path).await?;
        output.verbose(&format!("Manifest written to {}", path.display()))?;
    }

    output.success(&format!("Released {} {}", product, outcome.version))?;
    Ok(())
}

/// Cancels the run on the first interrupt and calls `force_exit` on the
/// second, which may arrive while a killed tool is still being reaped.
async fn watch_interrupts<S, F>(
    mut next_interrupt: S,
    cancel: CancellationToken,
    force_exit: impl FnOnce(),
) where
    S: FnMut() -> F,
    F: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return;
    }
    log::warn!("Interrupted, stopping the running tool (interrupt again to exit now)");
    cancel.cancel();

    if next_interrupt().await.is_ok() {
        log::error!("Interrupted again, exiting");
        force_exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_arguments_exit_one() {
        assert_eq!(run_from(["release-builder"]).await, 1);
    }

    #[tokio::test]
    async fn unknown_build_kind_exits_two() {
        assert_eq!(run_from(["release-builder", "nightly", "key.pfx"]).await, 2);
    }

    #[tokio::test]
    async fn second_interrupt_forces_exit() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};
        use tokio::sync::Notify;

        let interrupts = Arc::new(Notify::new());
        let forced = Arc::new(AtomicBool::new(false));
        let cancel = CancellationToken::new();

        let watcher = {
            let interrupts = interrupts.clone();
            let forced = forced.clone();
            tokio::spawn(watch_interrupts(
                move || {
                    let interrupts = interrupts.clone();
                    async move {
                        interrupts.notified().await;
                        Ok(())
                    }
                },
                cancel.clone(),
                move || forced.store(true, Ordering::SeqCst),
            ))
        };

        interrupts.notify_one();
        cancel.cancelled().await;
        assert!(!forced.load(Ordering::SeqCst));

        interrupts.notify_one();
        watcher.await.unwrap();
        assert!(forced.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn missing_key_file_exits_one_before_any_tool() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().to_string_lossy().into_owned();
        let key = dir.path().join("absent.pfx").to_string_lossy().into_owned();
        let code = run_from(["release-builder", "--repo", &repo, "release", &key]).await;
        assert_eq!(code, 1);
    }
}
