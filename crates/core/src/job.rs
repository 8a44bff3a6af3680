// SPDX-License-Identifier: MIT

//! Job record and state machine.

use crate::ids::{JobId, WorkerId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum stored length of a job's last error message, in bytes.
pub const MAX_ERROR_LEN: usize = 500;

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Waiting in the queue for a worker to claim it.
    Pending,
    /// Claimed by a worker and currently executing.
    Processing,
    /// Finished with exit code zero. Terminal.
    Completed,
    /// Declared by the data model; no current transition produces it.
    Failed,
    /// Exhausted its retries and moved to the dead letter queue. Terminal.
    Dead,
}

crate::simple_display! {
    JobState {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
        Dead => "dead",
    }
}

impl FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobState::Pending),
            "processing" => Ok(JobState::Processing),
            "completed" => Ok(JobState::Completed),
            "failed" => Ok(JobState::Failed),
            "dead" => Ok(JobState::Dead),
            other => Err(format!("unknown job state: {other:?}")),
        }
    }
}

impl JobState {
    /// All declared states, in display order.
    pub const ALL: [JobState; 5] = [
        JobState::Pending,
        JobState::Processing,
        JobState::Completed,
        JobState::Failed,
        JobState::Dead,
    ];

    /// Terminal states never leave the store through the job lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Dead)
    }
}

/// A durably recorded unit of work: a shell command plus scheduling metadata.
///
/// Timestamps are epoch milliseconds. `next_run_at` equals `run_at` on
/// creation and is advanced by backoff on each failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub command: String,
    pub state: JobState,
    pub priority: i64,
    /// Retries allowed after the first attempt; total attempts = max_retries + 1.
    pub max_retries: i64,
    /// Completed or interrupted execution attempts so far.
    pub attempts: i64,
    pub timeout_seconds: Option<i64>,
    pub run_at: i64,
    pub next_run_at: i64,
    /// Holder of the current claim; non-null exactly while processing.
    pub worker_id: Option<WorkerId>,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Job {
    /// Retries remaining before the next failure dead-letters the job.
    pub fn retries_remaining(&self) -> i64 {
        (self.max_retries - self.attempts).max(0)
    }
}

/// Truncate an error message to [`MAX_ERROR_LEN`] on a UTF-8 boundary.
pub fn truncate_error(message: &str) -> String {
    if message.len() <= MAX_ERROR_LEN {
        return message.to_string();
    }
    let mut end = MAX_ERROR_LEN;
    while end > 0 && !message.is_char_boundary(end) {
        end -= 1;
    }
    message[..end].to_string()
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            id: JobId = JobId::new("job-test"),
            command: String = "true",
        }
        set {
            state: JobState = JobState::Pending,
            priority: i64 = 0,
            max_retries: i64 = 3,
            attempts: i64 = 0,
            run_at: i64 = 0,
            next_run_at: i64 = 0,
            created_at: i64 = 0,
            updated_at: i64 = 0,
        }
        option {
            timeout_seconds: i64 = None,
            worker_id: WorkerId = None,
            last_error: String = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
