//! Operator-facing terminal output.

use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Coloured progress output on stderr.
///
/// Diagnostics go through `log`; this is only for the operator-facing
/// progress lines and the release summary.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    choice: ColorChoice,
}

impl OutputManager {
    /// Creates an output manager.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        let choice = if std::env::var_os("NO_COLOR").is_some() {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Self {
            verbose,
            quiet,
            choice,
        }
    }

    fn write_styled(&self, spec: Option<&ColorSpec>, prefix: &str, message: &str) -> io::Result<()> {
        let mut stream = StandardStream::stderr(self.choice);
        if let Some(spec) = spec {
            stream.set_color(spec)?;
            write!(stream, "{}", prefix)?;
            stream.reset()?;
        } else {
            write!(stream, "{}", prefix)?;
        }
        writeln!(stream, "{}", message)
    }

    /// Print a message only in verbose mode.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }
        let spec = ColorSpec::new().set_fg(Some(Color::White)).set_dimmed(true).clone();
        self.write_styled(Some(&spec), "  ", message)
    }

    /// Print a warning.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let spec = ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true).clone();
        self.write_styled(Some(&spec), "warning: ", message)
    }

    /// Print an error. Shown even in quiet mode.
    pub fn error(&self, message: &str) -> io::Result<()> {
        let spec = ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true).clone();
        self.write_styled(Some(&spec), "error: ", message)
    }

    /// Print a success line.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let spec = ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true).clone();
        self.write_styled(Some(&spec), "✓ ", message)
    }

    /// Print a progress line.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let spec = ColorSpec::new().set_fg(Some(Color::Cyan)).clone();
        self.write_styled(Some(&spec), "→ ", message)
    }

    /// Print a section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let spec = ColorSpec::new().set_bold(true).clone();
        self.write_styled(None, "", "")?;
        self.write_styled(Some(&spec), title, "")
    }

    /// Print an indented line.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_styled(None, "    ", message)
    }
}
