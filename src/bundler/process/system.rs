//! Process execution on the host.

use super::{ToolCommand, ToolOutput, ToolRunner};
use crate::bundler::error::{Error, Result};
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

/// Grace period for a killed child to be reaped.
const KILL_GRACE: Duration = Duration::from_secs(10);

/// Runs commands as child processes of this one.
///
/// The child inherits this process's environment extended by the command's
/// additions. Stdout is streamed to the log line by line and captured;
/// stderr goes straight to the terminal.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
    cancel: CancellationToken,
}

enum Outcome {
    Exited(std::io::Result<std::process::ExitStatus>),
    TimedOut,
    Cancelled,
}

impl SystemRunner {
    /// Creates a runner that kills children after `timeout` or on `cancel`.
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    async fn run_child(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let mut process = Command::new(command.program());
        process
            .args(command.get_args())
            .envs(command.get_env().iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = command.get_current_dir() {
            process.current_dir(dir);
        }

        let mut child = process.spawn().map_err(|error| Error::CommandFailed {
            stage: command.stage().to_string(),
            command: command.to_string(),
            error,
        })?;

        let deadline = tokio::time::Instant::now() + self.timeout;
        let stdout = child.stdout.take();
        let mut reader = tokio::spawn(async move {
            let mut captured = String::new();
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    log::info!("  {}", line);
                    captured.push_str(&line);
                    captured.push('\n');
                }
            }
            captured
        });
        let reader_handle = reader.abort_handle();

        let outcome = tokio::select! {
            status = child.wait() => Outcome::Exited(status),
            _ = tokio::time::sleep_until(deadline) => Outcome::TimedOut,
            _ = self.cancel.cancelled() => Outcome::Cancelled,
        };

        match outcome {
            Outcome::Exited(Ok(status)) => {
                // A process the tool left behind can hold stdout open after
                // the tool itself exited.
                tokio::select! {
                    captured = &mut reader => Ok(ToolOutput {
                        code: status.code(),
                        stdout: captured.unwrap_or_default(),
                    }),
                    _ = tokio::time::sleep_until(deadline) => {
                        reader_handle.abort();
                        log::warn!(
                            "{} exited but its output stayed open past {}s",
                            command.program(),
                            self.timeout.as_secs()
                        );
                        Err(Error::Timeout {
                            stage: command.stage().to_string(),
                            command: command.to_string(),
                            secs: self.timeout.as_secs(),
                        })
                    }
                    _ = self.cancel.cancelled() => {
                        reader_handle.abort();
                        Err(Error::Cancelled {
                            stage: command.stage().to_string(),
                        })
                    }
                }
            }
            Outcome::Exited(Err(error)) => Err(Error::CommandFailed {
                stage: command.stage().to_string(),
                command: command.to_string(),
                error,
            }),
            Outcome::TimedOut => {
                log::warn!(
                    "{} timed out after {}s, terminating...",
                    command.program(),
                    self.timeout.as_secs()
                );
                kill(&mut child, command).await;
                reader_handle.abort();
                Err(Error::Timeout {
                    stage: command.stage().to_string(),
                    command: command.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
            Outcome::Cancelled => {
                log::warn!("Cancelled, terminating {}...", command.program());
                kill(&mut child, command).await;
                reader_handle.abort();
                Err(Error::Cancelled {
                    stage: command.stage().to_string(),
                })
            }
        }
    }
}

async fn kill(child: &mut Child, command: &ToolCommand) {
    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill {}: {}", command.program(), e);
    }
    let _ = tokio::time::timeout(KILL_GRACE, child.wait()).await;
}

impl ToolRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> impl Future<Output = Result<ToolOutput>> + Send {
        self.run_child(command)
    }
}
