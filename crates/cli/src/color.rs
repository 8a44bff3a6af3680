// SPDX-License-Identifier: MIT

//! Terminal color for queue output.
//!
//! A small grey-plus-steel-blue palette: headings stand out, identifiers
//! and timestamps recede, and job states that need attention (dead,
//! failed) render brighter than the healthy ones.

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    /// Section headings and attention states: pastel cyan / steel blue
    pub const HEADER: u8 = 74;
    /// States that need attention (dead, failed): light grey
    pub const ALERT: u8 = 250;
    /// Healthy job states: medium grey
    pub const STATE: u8 = 245;
    /// Muted / secondary text (ids, timestamps): darker grey
    pub const MUTED: u8 = 240;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the queue palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::ALERT)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::STATE)))))
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

const RESET: &str = "\x1b[0m";

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("{}{}{}", fg256(code), text, RESET)
    } else {
        text.to_string()
    }
}

/// Section heading (status output).
pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

/// Secondary detail: ids, timestamps.
pub fn muted(text: &str) -> String {
    paint(codes::MUTED, text)
}

/// A job or worker state cell. Dead and failed jobs render brighter so
/// they stand out in a full listing; everything else stays secondary.
pub fn state(text: &str) -> String {
    match text.trim_end() {
        "dead" | "failed" => paint(codes::ALERT, text),
        _ => paint(codes::STATE, text),
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
