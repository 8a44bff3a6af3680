// SPDX-License-Identifier: MIT

//! Minimal column-aligned table rendering for list commands.

use std::fmt::Write;

use crate::color;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Muted,
    Status,
}

pub struct Column {
    header: &'static str,
    tone: Tone,
    max: Option<usize>,
}

impl Column {
    /// Left-aligned plain column.
    pub fn left(header: &'static str) -> Self {
        Self {
            header,
            tone: Tone::Plain,
            max: None,
        }
    }

    /// Column rendered in the muted color (ids, timestamps).
    pub fn muted(header: &'static str) -> Self {
        Self {
            header,
            tone: Tone::Muted,
            max: None,
        }
    }

    /// Column carrying a state value, rendered in the context color.
    pub fn status(header: &'static str) -> Self {
        Self {
            header,
            tone: Tone::Status,
            max: None,
        }
    }

    /// Truncate cells to at most `max` characters.
    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Add a row. Extra cells are dropped, missing cells render empty.
    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn render(&self, out: &mut String) {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let cell_max = self
                    .rows
                    .iter()
                    .map(|row| self.cell(row, i).chars().count())
                    .max()
                    .unwrap_or(0);
                cell_max.max(column.header.chars().count())
            })
            .collect();

        // The last column is never padded, so lines carry no trailing spaces.
        let last = self.columns.len().saturating_sub(1);

        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            if i == last {
                out.push_str(column.header);
            } else {
                let _ = write!(out, "{:<width$}", column.header, width = widths[i]);
            }
        }
        out.push('\n');

        for row in &self.rows {
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    out.push_str("  ");
                }
                let cell = self.cell(row, i);
                let padded = if i == last {
                    cell
                } else {
                    format!("{:<width$}", cell, width = widths[i])
                };
                let painted = match column.tone {
                    Tone::Plain => padded,
                    Tone::Muted => color::muted(&padded),
                    Tone::Status => color::state(&padded),
                };
                out.push_str(&painted);
            }
            out.push('\n');
        }
    }

    fn cell(&self, row: &[String], index: usize) -> String {
        let raw = row.get(index).map(String::as_str).unwrap_or("");
        match self.columns[index].max {
            Some(max) if raw.chars().count() > max => {
                let truncated: String = raw.chars().take(max.saturating_sub(1)).collect();
                format!("{truncated}\u{2026}")
            }
            _ => raw.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
