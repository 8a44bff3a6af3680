// SPDX-License-Identifier: MIT

//! Dead letter queue entry.

use crate::ids::{DlqId, JobId};
use serde::{Deserialize, Serialize};

/// Frozen record of a job that exhausted its retries.
///
/// Created atomically with the job's transition to `dead`; destroyed by
/// explicit purge, or by a retry which spawns a fresh job and removes the
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlqEntry {
    pub dlq_id: DlqId,
    pub original_job_id: JobId,
    pub command: String,
    pub attempts: i64,
    pub last_error: Option<String>,
    /// Epoch milliseconds at which the job was moved to the DLQ.
    pub moved_at: i64,
}

crate::builder! {
    pub struct DlqEntryBuilder => DlqEntry {
        into {
            dlq_id: DlqId = DlqId::new("dlq-test"),
            original_job_id: JobId = JobId::new("job-test"),
            command: String = "false",
        }
        set {
            attempts: i64 = 1,
            moved_at: i64 = 0,
        }
        option {
            last_error: String = None,
        }
    }
}
