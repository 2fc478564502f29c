//! External program execution and scoped file writes.

pub mod interactive;
pub mod rehearsal;

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Debug)]
pub enum ProcessError {
    /// The child could not be created.
    Spawn(io::Error),
    /// Pseudo-terminal allocation or attachment failed.
    Pty(String),
    /// Reading, writing, or waiting on the child failed.
    Io(io::Error),
    /// The caller terminal's mode could not be captured or switched.
    Terminal(io::Error),
    /// The interactive wait was cancelled through the wake pipe.
    Cancelled,
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn(err) => write!(f, "failed to spawn child: {err}"),
            ProcessError::Pty(err) => write!(f, "pseudo-terminal error: {err}"),
            ProcessError::Io(err) => write!(f, "child i/o error: {err}"),
            ProcessError::Terminal(err) => write!(f, "terminal mode error: {err}"),
            ProcessError::Cancelled => write!(f, "interactive wait cancelled"),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Spawn(err)
            | ProcessError::Io(err)
            | ProcessError::Terminal(err) => Some(err),
            _ => None,
        }
    }
}

/// Split an argument string on ASCII whitespace.
///
/// This boundary cannot represent arguments with embedded whitespace;
/// callers needing that must pre-split and drive [`Command`] themselves.
pub fn split_args(args: &str) -> Vec<String> {
    args.split_ascii_whitespace().map(str::to_string).collect()
}

/// Run `program` with captured stdout, blocking until it exits.
///
/// stderr is not redirected and flows to the caller's stderr. The child is
/// always reaped. Output is returned as-is even when the child exits
/// nonzero; exit status is not surfaced, so callers treat empty output as
/// the failure signal.
pub fn run_captured(program: &str, args: &str) -> Result<String, ProcessError> {
    let output = Command::new(program)
        .args(split_args(args))
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .map_err(ProcessError::Spawn)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Write `content` to `path`, truncating any prior content. Either the full
/// content becomes observable or an error is reported.
pub fn write_file(path: impl AsRef<Path>, content: &str) -> Result<(), ProcessError> {
    fs::write(path, content).map_err(ProcessError::Io)
}

#[cfg(test)]
#[path = "../../tests/unit/process/mod.rs"]
mod tests;
