//! Multi-architecture compiled build.
//!
//! Architectures are built one after another in configured order. Each one
//! is signed before the next build starts; a failure anywhere stops the run
//! so no installer is made from a half-built set.

use crate::bundler::artifact::{Artifact, ArtifactRole};
use crate::bundler::builder::CodeSigner;
use crate::bundler::error::Result;
use crate::bundler::process::{Invoker, ToolCommand, ToolRunner};
use crate::bundler::{Architecture, Settings};
use std::path::PathBuf;

/// Build configuration passed to every build.
const CONFIGURATION: &str = "Release";

/// Outputs of one architecture's build.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArchOutputs {
    /// Architecture built
    pub arch: Architecture,
    /// Shared library
    pub library: PathBuf,
    /// Engine executable
    pub executable: PathBuf,
}

impl ArchOutputs {
    /// The outputs as artifacts.
    pub fn artifacts(&self) -> [Artifact; 2] {
        [
            Artifact::for_arch(ArtifactRole::Library, self.library.clone(), self.arch),
            Artifact::for_arch(ArtifactRole::Executable, self.executable.clone(), self.arch),
        ]
    }
}

/// Build command for one architecture.
pub fn build_command(settings: &Settings, arch: Architecture) -> ToolCommand {
    let build = settings.build_settings();
    ToolCommand::new(format!("build {arch}"), settings.tools().msbuild.as_str())
        .arg_path(settings.solution_path(arch))
        .arg(format!("/p:Configuration={CONFIGURATION}"))
        .arg(format!(
            "/target:{};{}",
            build.library_target, build.executable_target
        ))
}

/// Builds and signs every configured architecture.
pub async fn build_all<R: ToolRunner>(
    settings: &Settings,
    signer: &CodeSigner,
    invoker: &Invoker<R>,
) -> Result<Vec<ArchOutputs>> {
    let mut outputs = Vec::with_capacity(settings.architectures().len());

    for &arch in settings.architectures() {
        log::info!("Building {}", arch);
        invoker.invoke(&build_command(settings, arch)).await?;

        let built = ArchOutputs {
            arch,
            library: settings.library_path(arch),
            executable: settings.executable_path(arch),
        };
        signer
            .sign(
                invoker,
                &format!("sign {arch} binaries"),
                &[&built.library, &built.executable],
            )
            .await?;

        outputs.push(built);
    }

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::builder::SigningKey;
    use crate::bundler::process::RecordingRunner;
    use crate::bundler::{Error, SettingsBuilder};
    use tokio_util::sync::CancellationToken;

    fn settings() -> Settings {
        SettingsBuilder::new().repo_root("/repo").build().unwrap()
    }

    #[test]
    fn build_command_targets_both_products() {
        let cmd = build_command(&settings(), Architecture::X64);
        assert_eq!(cmd.program(), "msbuild");
        assert_eq!(
            cmd.get_args(),
            [
                "/repo/build/x64/adblockplus.sln",
                "/p:Configuration=Release",
                "/target:AdblockPlus;AdblockPlusEngine",
            ]
        );
    }

    #[tokio::test]
    async fn builds_then_signs_each_architecture_in_order() {
        let settings = settings();
        let signer = CodeSigner::new(&settings, SigningKey::new("/key.pfx"));
        let invoker = Invoker::new(RecordingRunner::new(), CancellationToken::new());

        let outputs = build_all(&settings, &signer, &invoker).await.unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].arch, Architecture::Ia32);
        let calls = invoker.runner().calls();
        let stages: Vec<_> = calls.iter().map(|c| c.stage().to_string()).collect();
        assert_eq!(
            stages,
            [
                "build ia32",
                "sign ia32 binaries",
                "build x64",
                "sign x64 binaries"
            ]
        );
        let sign_args = calls[1].get_args();
        assert_eq!(
            &sign_args[sign_args.len() - 2..],
            [
                "/repo/build/ia32/Release/AdblockPlus.dll",
                "/repo/build/ia32/Release/AdblockPlusEngine.exe",
            ]
        );
    }

    #[tokio::test]
    async fn build_failure_stops_before_later_architectures() {
        let settings = settings();
        let signer = CodeSigner::new(&settings, SigningKey::new("/key.pfx"));
        let runner = RecordingRunner::new();
        runner.fail_program("msbuild", 1);
        let invoker = Invoker::new(runner, CancellationToken::new());

        let err = build_all(&settings, &signer, &invoker).await.unwrap_err();

        assert_eq!(err.tool_exit_code(), Some(1));
        assert!(matches!(
            err,
            Error::ToolFailed { ref stage, .. } if stage == "build ia32"
        ));
        assert_eq!(invoker.runner().programs(), ["msbuild"]);
    }
}
