// SPDX-License-Identifier: MIT

//! Job specification parsing and validation.
//!
//! Job specs arrive as untyped JSON from the CLI. Unknown fields are
//! rejected rather than ignored.

use crate::ids::JobId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw job specification as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_at: Option<String>,
}

/// A job spec that passed validation. Defaults not supplied here
/// (max_retries, run_at) are filled in by the queue service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSpec {
    pub id: Option<JobId>,
    pub command: String,
    pub priority: i64,
    pub max_retries: Option<i64>,
    pub timeout_seconds: Option<i64>,
    /// Parsed `run_at`, epoch milliseconds.
    pub run_at_ms: Option<i64>,
}

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("invalid job spec JSON: {0}")]
    Json(String),
    #[error("command is required and must be non-empty")]
    MissingCommand,
    #[error("id must be non-empty when provided")]
    EmptyId,
    #[error("max_retries must be >= 0, got {0}")]
    NegativeMaxRetries(i64),
    #[error("timeout_seconds must be > 0, got {0}")]
    NonPositiveTimeout(i64),
    #[error("run_at must be an RFC 3339 timestamp, got {0:?}")]
    InvalidRunAt(String),
}

impl JobSpec {
    /// Parse a spec from its JSON form, rejecting unknown fields.
    pub fn from_json(raw: &str) -> Result<Self, SpecError> {
        serde_json::from_str(raw).map_err(|e| SpecError::Json(e.to_string()))
    }

    /// Validate field constraints and parse `run_at`.
    pub fn validate(&self) -> Result<ValidatedSpec, SpecError> {
        let command = match self.command.as_deref() {
            Some(c) if !c.trim().is_empty() => c.to_string(),
            _ => return Err(SpecError::MissingCommand),
        };

        let id = match self.id.as_deref() {
            Some("") => return Err(SpecError::EmptyId),
            Some(id) => Some(JobId::new(id)),
            None => None,
        };

        if let Some(retries) = self.max_retries {
            if retries < 0 {
                return Err(SpecError::NegativeMaxRetries(retries));
            }
        }

        if let Some(timeout) = self.timeout_seconds {
            if timeout <= 0 {
                return Err(SpecError::NonPositiveTimeout(timeout));
            }
        }

        let run_at_ms = match self.run_at.as_deref() {
            Some(raw) => Some(parse_run_at(raw)?),
            None => None,
        };

        Ok(ValidatedSpec {
            id,
            command,
            priority: self.priority.unwrap_or(0),
            max_retries: self.max_retries,
            timeout_seconds: self.timeout_seconds,
            run_at_ms,
        })
    }
}

fn parse_run_at(raw: &str) -> Result<i64, SpecError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| SpecError::InvalidRunAt(raw.to_string()))
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
