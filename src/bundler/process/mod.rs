//! External tool invocation.
//!
//! Every external program the pipeline runs goes through [`ToolCommand`] and
//! a [`ToolRunner`]. The command carries everything needed to start the
//! process (program, ordered arguments, working directory, environment
//! additions, accepted exit codes) plus the stage it belongs to, so that
//! capture and error translation are the same for every stage.
//!
//! - [`SystemRunner`] spawns real processes with a timeout and cancellation.
//! - [`RecordingRunner`] records commands and replays scripted results.
//!
//! [`Invoker`] pairs a runner with the run's cancellation token and is what
//! the stages call.

mod recording;
mod system;

pub use recording::RecordingRunner;
pub use system::SystemRunner;

use crate::bundler::error::{Error, Result};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// One invocation of an external program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCommand {
    stage: String,
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env: Vec<(String, String)>,
    success_codes: Vec<i32>,
}

impl ToolCommand {
    /// Creates a command for `program` run as part of `stage`.
    pub fn new(stage: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env: Vec::new(),
            success_codes: vec![0],
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends a path argument.
    pub fn arg_path(self, path: impl AsRef<Path>) -> Self {
        let arg = path.as_ref().to_string_lossy().into_owned();
        self.arg(arg)
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Adds an environment variable on top of the inherited environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Replaces the set of exit codes treated as success.
    pub fn success_codes(mut self, codes: impl Into<Vec<i32>>) -> Self {
        self.success_codes = codes.into();
        self
    }

    /// Pipeline stage this command belongs to.
    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Program to run.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments, in order.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Working directory, if set.
    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Environment additions, in the order they were added.
    pub fn get_env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Value of an environment addition.
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether an exit code counts as success.
    pub fn is_success(&self, code: Option<i32>) -> bool {
        code.is_some_and(|code| self.success_codes.contains(&code))
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Result of a finished process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
}

impl ToolOutput {
    /// Successful exit with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
        }
    }

    /// Exit with the given code and no output.
    pub fn exit(code: i32) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
        }
    }
}

/// Runs external commands.
///
/// Implementations return `Ok` for any process that ran to completion,
/// whatever its exit code; [`Invoker::invoke`] decides what counts as failure.
pub trait ToolRunner: Send + Sync {
    /// Runs `command` to completion.
    fn run(&self, command: &ToolCommand) -> impl Future<Output = Result<ToolOutput>> + Send;
}

/// Runs commands for one pipeline run.
#[derive(Debug)]
pub struct Invoker<R> {
    runner: R,
    cancel: CancellationToken,
}

impl<R: ToolRunner> Invoker<R> {
    /// Creates an invoker over `runner` honoring `cancel`.
    pub fn new(runner: R, cancel: CancellationToken) -> Self {
        Self { runner, cancel }
    }

    /// Returns the underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Returns the cancellation token of this run.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs `command` and checks its exit code.
    ///
    /// No process is started once the run is cancelled.
    pub async fn invoke(&self, command: &ToolCommand) -> Result<ToolOutput> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled {
                stage: command.stage().to_string(),
            });
        }

        log::debug!("[{}] {}", command.stage(), command);
        let output = self.runner.run(command).await?;

        if !command.is_success(output.code) {
            return Err(Error::ToolFailed {
                stage: command.stage().to_string(),
                command: command.to_string(),
                code: output.code,
            });
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_command_line_with_quoting() {
        let cmd = ToolCommand::new("sign", "signtool")
            .args(["sign", "/d", "Adblock Plus"])
            .arg_path("C:/build/a.dll");
        assert_eq!(
            cmd.to_string(),
            "signtool sign /d \"Adblock Plus\" C:/build/a.dll"
        );
    }

    #[test]
    fn env_value_returns_last_addition() {
        let cmd = ToolCommand::new("package", "nmake")
            .env("VERSION", "1.0")
            .env("VERSION", "1.1");
        assert_eq!(cmd.env_value("VERSION"), Some("1.1"));
        assert_eq!(cmd.env_value("PATH"), None);
    }

    #[test]
    fn signal_termination_is_never_success() {
        let cmd = ToolCommand::new("build", "msbuild");
        assert!(cmd.is_success(Some(0)));
        assert!(!cmd.is_success(Some(1)));
        assert!(!cmd.is_success(None));
    }

    #[tokio::test]
    async fn invoke_translates_nonzero_exit() {
        let runner = RecordingRunner::new();
        runner.fail_program("msbuild", 3);
        let invoker = Invoker::new(runner, CancellationToken::new());

        let err = invoker
            .invoke(&ToolCommand::new("build ia32", "msbuild"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ToolFailed { ref stage, code: Some(3), .. } if stage == "build ia32"
        ));
    }

    #[tokio::test]
    async fn invoke_accepts_configured_success_codes() {
        let runner = RecordingRunner::new();
        runner.fail_program("robocopy", 1);
        let invoker = Invoker::new(runner, CancellationToken::new());

        let cmd = ToolCommand::new("copy", "robocopy").success_codes([0, 1]);
        assert!(invoker.invoke(&cmd).await.is_ok());
    }

    #[tokio::test]
    async fn cancelled_invoker_starts_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let invoker = Invoker::new(RecordingRunner::new(), cancel);

        let err = invoker
            .invoke(&ToolCommand::new("build ia32", "msbuild"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled { .. }));
        assert!(invoker.runner().calls().is_empty());
    }
}
