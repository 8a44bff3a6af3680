// SPDX-License-Identifier: MIT

//! Output helpers shared by all commands: text-or-JSON switching, list
//! rendering, and timestamp formatting.

use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print `value` as pretty JSON, or run the text renderer.
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(),
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(),
    }
    Ok(())
}

/// Print a list as JSON, an empty-state message, or a rendered table.
pub fn handle_list<T: Serialize>(
    format: OutputFormat,
    items: &[T],
    empty_message: &str,
    render: impl FnOnce(&[T], &mut String),
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
        OutputFormat::Text => {
            if items.is_empty() {
                println!("{empty_message}");
            } else {
                let mut out = String::new();
                render(items, &mut out);
                print!("{out}");
            }
        }
    }
    Ok(())
}

/// Epoch milliseconds as `YYYY-MM-DD HH:MM:SS` UTC, or `-` when absent.
pub fn format_timestamp(epoch_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(epoch_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Compact age like `4s`, `2m`, `3h`, for heartbeat displays.
pub fn format_age(age_ms: i64) -> String {
    let seconds = (age_ms / 1_000).max(0);
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3_600 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}h", seconds / 3_600)
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
