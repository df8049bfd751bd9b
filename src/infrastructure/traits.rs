//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};

use colored::Colorize;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Rename a file or directory.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Exit status and captured streams of an external command.
///
/// `stdout`/`stderr` are empty when the command ran attached to the terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// External command runner abstraction.
///
/// Commands are always an argument vector; nothing goes through a shell.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments, capturing its output.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput>;

    /// Run a command with arguments, inheriting the terminal's stdio.
    /// Blocks until the command exits.
    fn run_attached(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

/// Line-oriented operator interaction.
pub trait Console: Send + Sync {
    /// Show `prompt` and read one line of input, without its line terminator.
    /// Returns an empty string at end of input.
    fn read_line(&self, prompt: &str) -> io::Result<String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput> {
        Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map(CommandOutput::from)
    }

    fn run_attached(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let status = Command::new(cmd).args(args).status()?;
        Ok(CommandOutput {
            code: status.code(),
            ..CommandOutput::default()
        })
    }
}

/// Console on the process's stdin/stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn read_line(&self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{} ", prompt.cyan())?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(strip_line_ending(&line).to_string())
    }
}

/// Remove a single trailing `\n` or `\r\n`; everything else is kept verbatim.
pub fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}
