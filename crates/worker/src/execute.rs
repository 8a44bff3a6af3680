// SPDX-License-Identifier: MIT

//! Child-process execution of a claimed job.
//!
//! Commands run under the host shell so timeouts have a killable subject.
//! Stderr is captured in memory (bounded) for the failure message; stdout
//! is discarded.

use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use qc_core::Job;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, Command};

/// Grace between SIGTERM and SIGKILL when a job overruns its timeout.
const KILL_GRACE: Duration = Duration::from_secs(2);
/// Bound on captured stderr; the persisted error is truncated further.
const STDERR_CAP: usize = 4096;
/// How long to wait for the stderr pipe after the child exits. Grandchildren
/// inheriting the pipe can hold it open indefinitely.
const STDERR_DRAIN: Duration = Duration::from_millis(500);

/// Result of one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Exit code zero.
    Success,
    /// Non-zero exit, timeout, or spawn failure; `message` feeds the
    /// centralized failure handler and `last_error`.
    Failure { message: String },
}

impl ExecOutcome {
    fn failure(message: impl Into<String>) -> Self {
        ExecOutcome::Failure {
            message: message.into(),
        }
    }
}

/// Run the job's command to completion or timeout.
pub(crate) async fn run_job(job: &Job) -> ExecOutcome {
    let mut command = Command::new("/bin/sh");
    command
        .arg("-c")
        .arg(&job.command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => return ExecOutcome::failure(format!("Failed to spawn command: {err}")),
    };

    let stderr = child.stderr.take();
    let stderr_task = tokio::spawn(read_capped(stderr));

    let status = match job.timeout_seconds {
        Some(seconds) => {
            let limit = Duration::from_secs(seconds.max(0) as u64);
            match tokio::time::timeout(limit, child.wait()).await {
                Ok(waited) => waited,
                Err(_) => {
                    terminate(&mut child).await;
                    stderr_task.abort();
                    return ExecOutcome::failure(format!("Timed out after {seconds}s"));
                }
            }
        }
        None => child.wait().await,
    };

    let stderr_text = match tokio::time::timeout(STDERR_DRAIN, stderr_task).await {
        Ok(Ok(text)) => text,
        _ => String::new(),
    };

    match status {
        Ok(status) if status.success() => ExecOutcome::Success,
        Ok(status) => {
            let code = status.code().unwrap_or(-1);
            let mut message = format!("Command failed with exit code {code}");
            if !stderr_text.is_empty() {
                message.push_str(": ");
                message.push_str(&stderr_text);
            }
            ExecOutcome::failure(message)
        }
        Err(err) => ExecOutcome::failure(format!("Failed to wait for command: {err}")),
    }
}

/// SIGTERM the child, give it a short grace, then SIGKILL.
async fn terminate(child: &mut Child) {
    if let Some(pid) = child.id() {
        kill(Pid::from_raw(pid as i32), Signal::SIGTERM).ok();
    }
    if tokio::time::timeout(KILL_GRACE, child.wait()).await.is_err() {
        child.kill().await.ok();
    }
}

/// Drain stderr, keeping at most [`STDERR_CAP`] bytes. The pipe is read to
/// EOF regardless so the child never blocks on a full pipe.
async fn read_capped(stderr: Option<ChildStderr>) -> String {
    let Some(mut stderr) = stderr else {
        return String::new();
    };
    let mut captured = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match stderr.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if captured.len() < STDERR_CAP {
                    let take = (STDERR_CAP - captured.len()).min(n);
                    captured.extend_from_slice(&chunk[..take]);
                }
            }
        }
    }
    String::from_utf8_lossy(&captured).trim_end().to_string()
}

#[cfg(test)]
#[path = "execute_tests.rs"]
mod tests;
