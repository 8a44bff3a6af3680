// SPDX-License-Identifier: MIT

//! Worker liveness registration.

use crate::ids::WorkerId;
use serde::{Deserialize, Serialize};

/// Registry row for a running worker process.
///
/// Inserted at worker start, refreshed by heartbeats, removed on graceful
/// shutdown. A worker whose heartbeat is older than the staleness threshold
/// is eligible for orphan recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub worker_id: WorkerId,
    pub pid: i64,
    pub hostname: String,
    pub started_at: i64,
    pub last_heartbeat_at: i64,
}

impl WorkerRecord {
    /// Strict staleness check: heartbeat older than `timeout_seconds` at `now_ms`.
    pub fn is_stale(&self, now_ms: i64, timeout_seconds: i64) -> bool {
        now_ms - self.last_heartbeat_at > timeout_seconds * 1_000
    }
}

crate::builder! {
    pub struct WorkerRecordBuilder => WorkerRecord {
        into {
            worker_id: WorkerId = WorkerId::new("wrk-test"),
            hostname: String = "localhost",
        }
        set {
            pid: i64 = 1234,
            started_at: i64 = 0,
            last_heartbeat_at: i64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
