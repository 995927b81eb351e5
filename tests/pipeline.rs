//! End-to-end pipeline runs against a recording runner.

use release_builder::bundler::process::{RecordingRunner, ToolOutput};
use release_builder::bundler::{
    ArtifactRole, ConfigError, Error, PackageSettings, Pipeline, Settings, SettingsBuilder,
    SigningKey,
};
use release_builder::metadata::BuildKind;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn checkout(version_line: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("src/shared/Version.h");
    std::fs::create_dir_all(header.parent().unwrap()).unwrap();
    std::fs::write(
        &header,
        format!("#ifndef VERSION_H\n#define VERSION_H\n{version_line}\n#endif\n"),
    )
    .unwrap();
    dir
}

fn settings(root: &Path) -> Settings {
    SettingsBuilder::new()
        .repo_root(root)
        .package_settings(PackageSettings {
            product_name: "product".into(),
            ..Default::default()
        })
        .build()
        .unwrap()
}

fn pipeline(root: &Path, kind: BuildKind, runner: RecordingRunner) -> Pipeline<RecordingRunner> {
    Pipeline::new(
        settings(root),
        kind,
        SigningKey::new("/keys/release.pfx"),
        runner,
        CancellationToken::new(),
    )
}

fn file_names(paths: impl Iterator<Item = impl AsRef<Path>>) -> Vec<String> {
    paths
        .map(|p| {
            p.as_ref()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

#[tokio::test]
async fn devbuild_appends_revision_digits() {
    let repo = checkout(r#"#define IEPLUGIN_VERSION "1.2""#);
    let runner = RecordingRunner::new();
    runner.respond_to("hg", ToolOutput::success("abc123+\n"));

    let pipeline = pipeline(repo.path(), BuildKind::DevBuild, runner);
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.version.as_str(), "1.2.123");
    let packages = file_names(
        outcome
            .artifacts_with_role(ArtifactRole::InstallerPackage)
            .map(|a| a.path()),
    );
    assert_eq!(packages, ["product-1.2.123-ia32.msi", "product-1.2.123-x64.msi"]);
    let bundle = file_names(outcome.artifacts_with_role(ArtifactRole::Bundle).map(|a| a.path()));
    assert_eq!(bundle, ["product-1.2.123.exe"]);
    let engine = file_names(
        outcome
            .artifacts_with_role(ArtifactRole::EnginePayload)
            .map(|a| a.path()),
    );
    assert_eq!(engine, ["engine-1.2.123.exe"]);

    let calls = pipeline.invoker().runner().calls();
    assert_eq!(calls[0].program(), "hg");
    assert_eq!(calls[1].get_args(), ["1.2.123", "devbuild"]);
}

#[tokio::test]
async fn release_uses_header_version_verbatim() {
    let repo = checkout(r#"#define IEPLUGIN_VERSION "2""#);
    let pipeline = pipeline(repo.path(), BuildKind::Release, RecordingRunner::new());

    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.version.as_str(), "2");
    assert_eq!(outcome.build_kind, BuildKind::Release);
    assert!(!pipeline.invoker().runner().programs().contains(&"hg".to_string()));
}

#[tokio::test]
async fn release_runs_every_stage_in_order() {
    let repo = checkout(r#"#define IEPLUGIN_VERSION "2""#);
    let pipeline = pipeline(repo.path(), BuildKind::Release, RecordingRunner::new());

    pipeline.run().await.unwrap();

    let calls = pipeline.invoker().runner().calls();
    let generator = repo.path().join("createsolution.bat");
    let programs: Vec<&str> = calls.iter().map(|c| c.program()).collect();
    assert_eq!(
        programs,
        [
            generator.to_str().unwrap(),
            "msbuild",
            "signtool",
            "msbuild",
            "signtool",
            "nmake",
            "signtool",
            "iscc",
            "insignia",
            "signtool",
            "insignia",
            "signtool",
        ]
    );
    assert_eq!(calls[8].get_args()[0], "-ib");
    assert_eq!(calls[10].get_args()[0], "-ab");
    assert_eq!(calls[5].env_value("VERSION"), Some("2"));
    assert_eq!(calls[7].env_value("VERSION"), Some("2"));
    assert!(calls[1].stage().contains("ia32"));
    assert!(calls[3].stage().contains("x64"));
}

#[tokio::test]
async fn devbuild_continues_after_packaging_failure() {
    let repo = checkout(r#"#define IEPLUGIN_VERSION "1.2""#);
    let runner = RecordingRunner::new();
    runner.respond_to("hg", ToolOutput::success("7\n"));
    runner.fail_program("nmake", 2);
    let ia32 = repo.path().join("build/ia32/product-1.2.7-ia32.msi");
    runner.on_call(
        |cmd| cmd.program() == "nmake",
        move |_| {
            std::fs::create_dir_all(ia32.parent().unwrap()).unwrap();
            std::fs::write(&ia32, b"msi").unwrap();
        },
    );

    let pipeline = pipeline(repo.path(), BuildKind::DevBuild, runner);
    let outcome = pipeline.run().await.unwrap();

    let packages = file_names(
        outcome
            .artifacts_with_role(ArtifactRole::InstallerPackage)
            .map(|a| a.path()),
    );
    assert_eq!(packages, ["product-1.2.7-ia32.msi"]);
    assert!(pipeline.invoker().runner().programs().contains(&"iscc".to_string()));
}

#[tokio::test]
async fn release_aborts_on_packaging_failure() {
    let repo = checkout(r#"#define IEPLUGIN_VERSION "2""#);
    let runner = RecordingRunner::new();
    runner.fail_program("nmake", 2);

    let pipeline = pipeline(repo.path(), BuildKind::Release, runner);
    let err = pipeline.run().await.unwrap_err();

    assert_eq!(err.tool_exit_code(), Some(2));
    let programs = pipeline.invoker().runner().programs();
    assert_eq!(programs.last().map(String::as_str), Some("nmake"));
}

#[tokio::test]
async fn cancelled_run_starts_no_tool() {
    let repo = checkout(r#"#define IEPLUGIN_VERSION "2""#);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let pipeline = Pipeline::new(
        settings(repo.path()),
        BuildKind::Release,
        SigningKey::new("/keys/release.pfx"),
        RecordingRunner::new(),
        cancel,
    );

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, Error::Cancelled { .. }));
    assert!(pipeline.invoker().runner().calls().is_empty());
}

#[tokio::test]
async fn missing_version_macro_is_a_configuration_error() {
    let repo = checkout(r#"#define OTHER_VERSION "2""#);
    let pipeline = pipeline(repo.path(), BuildKind::Release, RecordingRunner::new());

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::MacroNotFound { .. })
    ));
    assert!(pipeline.invoker().runner().calls().is_empty());
}

#[tokio::test]
async fn devbuild_with_three_component_base_runs_no_tool() {
    let repo = checkout(r#"#define IEPLUGIN_VERSION "1.2.3""#);
    let pipeline = pipeline(repo.path(), BuildKind::DevBuild, RecordingRunner::new());

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidVersion { .. })
    ));
    assert!(pipeline.invoker().runner().calls().is_empty());
}
