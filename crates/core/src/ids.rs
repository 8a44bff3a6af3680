// SPDX-License-Identifier: MIT

//! Typed identifiers for jobs, dead-letter entries, and workers.

crate::string_id! {
    /// Unique identifier for a job.
    ///
    /// Caller-supplied on enqueue, or generated (`job-` + 19 random chars)
    /// when the job spec omits one.
    pub struct JobId("job-");
}

crate::string_id! {
    /// Unique identifier for a dead-letter entry, distinct from the
    /// original job id.
    pub struct DlqId("dlq-");
}

crate::string_id! {
    /// Unique identifier for a running worker process.
    pub struct WorkerId("wrk-");
}

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        s
    } else {
        let mut end = n.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
