//! Subprocess execution with captured output and an optional deadline.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time;

use crate::error::ProcessError;

#[derive(Debug)]
pub(crate) struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    /// Trimmed stdout of a successful run, `None` on failure or empty output.
    pub fn success_line(&self) -> Option<&str> {
        if !self.status.success() {
            return None;
        }
        let trimmed = self.stdout.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Run `cmd` to completion, feeding `stdin` if given.
///
/// The child is killed if the deadline passes (`kill_on_drop`), so a hung
/// process never outlives the call.
pub(crate) async fn run_captured(
    mut cmd: Command,
    stdin: Option<String>,
    timeout: Option<Duration>,
) -> Result<CapturedOutput, ProcessError> {
    let program = cmd.as_std().get_program().to_string_lossy().into_owned();

    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;

    // Feed stdin from its own task so a chatty child can't deadlock us on a full pipe.
    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => Some(tokio::spawn(async move {
            let result = pipe.write_all(input.as_bytes()).await;
            drop(pipe);
            result
        })),
        _ => None,
    };

    let output = match timeout {
        Some(after) => match time::timeout(after, child.wait_with_output()).await {
            Ok(result) => result,
            Err(_) => return Err(ProcessError::TimedOut { program, after }),
        },
        None => child.wait_with_output().await,
    }
    .map_err(|source| ProcessError::Io {
        program: program.clone(),
        source,
    })?;

    if let Some(writer) = writer
        && let Ok(Err(e)) = writer.await
    {
        // A child that exits without draining stdin yields EPIPE; its output still counts.
        tracing::debug!(program = %program, "stdin write failed: {e}");
    }

    Ok(CapturedOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
