//! Command execution primitives with consistent error handling.

use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Captured output and status of an external process.
///
/// A non-zero exit is not an error here: callers that give meaning to
/// specific exit codes (grep's "1 = no match") inspect `exit_code`.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Run a command and capture its output regardless of exit status.
///
/// Only a failure to spawn the process is an error.
pub fn run_captured<S: AsRef<std::ffi::OsStr>>(
    program: &str,
    args: &[S],
    context: &str,
) -> Result<CapturedOutput> {
    let mut command = Command::new(program);
    command.args(args);

    let output = command.output().map_err(|e| {
        Error::internal_io(
            format!("Failed to run {}: {}", context, e),
            Some(context.to_string()),
        )
    })?;

    Ok(CapturedOutput::from_output(&output))
}
