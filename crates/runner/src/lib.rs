//! Bounded execution of external tools.
//!
//! The OCR pipeline leans on well-known local CLIs (`img2pdf`, `ocrmypdf`,
//! `pdftotext`). This crate runs them with three guarantees:
//!
//! - **Bounded time**: an optional timeout kills the process on expiry.
//! - **Bounded memory**: captured output is capped (2 MiB by default) and
//!   marked `...[truncated]` when cut.
//! - **Faithful reporting**: every run returns a [`RunResult`] carrying a
//!   copy/pasteable command line, the exit code, duration, and captured
//!   streams, whether the command succeeded or not.

mod capture;

use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::capture::spawn_drain;

/// How a child process output stream is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Mirror to the parent's stream in real time.
    Stream,
    /// Capture into the result only.
    Capture,
    /// Drop entirely.
    Discard,
    /// Mirror and capture.
    #[default]
    StreamAndCapture,
}

impl OutputMode {
    fn captures(self) -> bool {
        matches!(self, OutputMode::Capture | OutputMode::StreamAndCapture)
    }

    fn streams(self) -> bool {
        matches!(self, OutputMode::Stream | OutputMode::StreamAndCapture)
    }
}

/// Options for a single command execution.
#[derive(Debug, Clone)]
pub struct RunOpts {
    /// Working directory for the child; inherits the parent's when unset.
    pub dir: Option<PathBuf>,
    /// Extra environment variables, merged over the parent environment.
    pub env: Vec<(String, String)>,
    /// Maximum execution time; no limit when unset.
    pub timeout: Option<Duration>,
    pub stdout_mode: OutputMode,
    pub stderr_mode: OutputMode,
    /// Cap on captured bytes per stream.
    pub max_capture_bytes: usize,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            dir: None,
            env: Vec::new(),
            timeout: None,
            stdout_mode: OutputMode::default(),
            stderr_mode: OutputMode::default(),
            max_capture_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Outcome of a command execution.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Printable, copy/pasteable command line (quoted where needed).
    pub cmd: String,
    pub exit_code: i32,
    pub duration: Duration,
    /// Captured stdout, possibly truncated.
    pub stdout: String,
    /// Captured stderr, possibly truncated.
    pub stderr: String,
}

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to spawn {bin}: {source}")]
    Spawn { bin: String, source: io::Error },
    #[error("command timed out after {timeout:?}: {cmd}")]
    Timeout { cmd: String, timeout: Duration },
    #[error("failed waiting for {cmd}: {source}")]
    Wait { cmd: String, source: io::Error },
    #[error("command failed: {} (exit code {})", .result.cmd, .result.exit_code)]
    NonZeroExit { result: RunResult },
}

/// Executes external commands.
#[derive(Debug, Default)]
pub struct Runner;

impl Runner {
    pub fn new() -> Self {
        Self
    }

    /// Locate a binary on `PATH`.
    pub fn look_path(&self, bin: &str) -> Option<PathBuf> {
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .map(|dir| dir.join(bin))
            .find(|candidate| candidate.is_file())
    }

    /// Run `bin` with `args`, honoring the timeout and output modes in
    /// `opts`. A non-zero exit is an error carrying the full [`RunResult`].
    pub fn run(&self, bin: &str, args: &[&str], opts: &RunOpts) -> Result<RunResult, RunError> {
        let start = Instant::now();
        let cmd_line = format_command(bin, args);
        debug!(cmd = %cmd_line, "running external command");

        let mut command = Command::new(bin);
        command.args(args);
        command.stdin(Stdio::null());
        if let Some(dir) = &opts.dir {
            command.current_dir(dir);
        }
        for (key, value) in &opts.env {
            command.env(key, value);
        }
        command.stdout(stdio_for(opts.stdout_mode));
        command.stderr(stdio_for(opts.stderr_mode));

        let mut child = command.spawn().map_err(|source| RunError::Spawn {
            bin: bin.to_string(),
            source,
        })?;

        let stdout_drain = child
            .stdout
            .take()
            .map(|pipe| spawn_drain(pipe, opts.stdout_mode, opts.max_capture_bytes, false));
        let stderr_drain = child
            .stderr
            .take()
            .map(|pipe| spawn_drain(pipe, opts.stderr_mode, opts.max_capture_bytes, true));

        // Poll for exit so the timeout can kill a hung child.
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if let Some(timeout) = opts.timeout {
                        if start.elapsed() > timeout {
                            let _ = child.kill();
                            let _ = child.wait();
                            return Err(RunError::Timeout {
                                cmd: cmd_line,
                                timeout,
                            });
                        }
                    }
                    std::thread::sleep(Duration::from_millis(25));
                }
                Err(source) => {
                    return Err(RunError::Wait {
                        cmd: cmd_line,
                        source,
                    })
                }
            }
        };

        let stdout = stdout_drain.map(|d| d.join()).unwrap_or_default();
        let stderr = stderr_drain.map(|d| d.join()).unwrap_or_default();

        let result = RunResult {
            cmd: cmd_line,
            exit_code: status.code().unwrap_or(-1),
            duration: start.elapsed(),
            stdout,
            stderr,
        };

        if !status.success() {
            return Err(RunError::NonZeroExit { result });
        }
        Ok(result)
    }
}

fn stdio_for(mode: OutputMode) -> Stdio {
    if mode.captures() {
        Stdio::piped()
    } else if mode.streams() {
        Stdio::inherit()
    } else {
        Stdio::null()
    }
}

/// Format a command and args as a safe, copy/pasteable string.
fn format_command(bin: &str, args: &[&str]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(quote_arg(bin));
    parts.extend(args.iter().map(|arg| quote_arg(arg)));
    parts.join(" ")
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "\"\"".to_string();
    }
    if arg.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}
