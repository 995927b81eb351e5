//! Recording runner for exercising the pipeline without external tools.

use super::{ToolCommand, ToolOutput, ToolRunner};
use crate::bundler::error::Result;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

type Predicate = Box<dyn Fn(&ToolCommand) -> bool + Send + Sync>;
type Effect = Box<dyn Fn(&ToolCommand) + Send + Sync>;

struct Rule {
    matches: Predicate,
    output: Option<ToolOutput>,
    effect: Option<Effect>,
}

/// Records every command and answers with scripted results.
///
/// Commands without a matching rule succeed with empty output. When several
/// rules match, the most recently added one decides the output and every
/// matching effect runs.
///
/// # Examples
///
/// ```
/// use release_builder::bundler::process::{RecordingRunner, ToolOutput};
///
/// let runner = RecordingRunner::new();
/// runner.respond_to("hg", ToolOutput::success("123+\n"));
/// runner.fail_program("nmake", 2);
/// assert!(runner.calls().is_empty());
/// ```
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<ToolCommand>>,
    rules: Mutex<Vec<Rule>>,
}

impl std::fmt::Debug for RecordingRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingRunner")
            .field("calls", &*lock(&self.calls))
            .field("rules", &lock(&self.rules).len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecordingRunner {
    /// Creates a runner where every command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers commands matching `predicate` with `output`.
    pub fn respond_when<F>(&self, predicate: F, output: ToolOutput)
    where
        F: Fn(&ToolCommand) -> bool + Send + Sync + 'static,
    {
        lock(&self.rules).push(Rule {
            matches: Box::new(predicate),
            output: Some(output),
            effect: None,
        });
    }

    /// Answers every invocation of `program` with `output`.
    pub fn respond_to(&self, program: &str, output: ToolOutput) {
        let program = program.to_string();
        self.respond_when(move |cmd| cmd.program() == program, output);
    }

    /// Makes every invocation of `program` exit with `code`.
    pub fn fail_program(&self, program: &str, code: i32) {
        self.respond_to(program, ToolOutput::exit(code));
    }

    /// Runs `effect` whenever a command matching `predicate` is invoked.
    ///
    /// Effects run before the output is returned, which lets tests create
    /// the files a real tool would have written.
    pub fn on_call<F, E>(&self, predicate: F, effect: E)
    where
        F: Fn(&ToolCommand) -> bool + Send + Sync + 'static,
        E: Fn(&ToolCommand) + Send + Sync + 'static,
    {
        lock(&self.rules).push(Rule {
            matches: Box::new(predicate),
            output: None,
            effect: Some(Box::new(effect)),
        });
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<ToolCommand> {
        lock(&self.calls).clone()
    }

    /// Programs run so far, in order.
    pub fn programs(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .map(|cmd| cmd.program().to_string())
            .collect()
    }

    fn answer(&self, command: &ToolCommand) -> ToolOutput {
        lock(&self.calls).push(command.clone());

        let rules = lock(&self.rules);
        let mut output = None;
        for rule in rules.iter().filter(|rule| (rule.matches)(command)) {
            if let Some(effect) = &rule.effect {
                effect(command);
            }
            if let Some(scripted) = &rule.output {
                output = Some(scripted.clone());
            }
        }
        output.unwrap_or_else(|| ToolOutput::success(""))
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, command: &ToolCommand) -> impl Future<Output = Result<ToolOutput>> + Send {
        let output = self.answer(command);
        async move { Ok(output) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn records_in_order_and_defaults_to_success() {
        let runner = RecordingRunner::new();
        runner.run(&ToolCommand::new("a", "first")).await.unwrap();
        runner.run(&ToolCommand::new("b", "second")).await.unwrap();
        assert_eq!(runner.programs(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn latest_matching_rule_wins() {
        let runner = RecordingRunner::new();
        runner.fail_program("nmake", 2);
        runner.respond_to("nmake", ToolOutput::success("ok"));
        let output = runner.run(&ToolCommand::new("p", "nmake")).await.unwrap();
        assert_eq!(output, ToolOutput::success("ok"));
    }

    #[tokio::test]
    async fn effects_run_for_matching_commands() {
        let runner = RecordingRunner::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        runner.on_call(
            |cmd| cmd.program() == "iscc",
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        runner.run(&ToolCommand::new("b", "iscc")).await.unwrap();
        runner.run(&ToolCommand::new("b", "insignia")).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
