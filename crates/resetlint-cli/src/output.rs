// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI output formatting with colors and styling.
//!
//! Respects NO_COLOR and FORCE_COLOR environment variables.
//! Colors are automatically disabled when output is piped.

use colored::{ColoredString, Colorize};

/// Initialize color support based on environment.
/// Call once at startup.
pub fn init() {
    // colored crate handles NO_COLOR automatically,
    // but we add explicit FORCE_COLOR support
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    } else if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
    }
}

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn fix_label() -> ColoredString {
    "fix".cyan()
}

pub fn fix_text(msg: &str) -> ColoredString {
    msg.dimmed()
}

pub fn error_arrow() -> ColoredString {
    "-->".blue()
}

pub fn line_number(n: usize) -> ColoredString {
    format!("{:3}", n).blue().bold()
}

pub fn pipe() -> ColoredString {
    "|".blue()
}

pub fn caret() -> ColoredString {
    "^".red().bold()
}

pub fn check_ok(file: &str) -> String {
    format!("{} {}", "OK".green().bold(), file)
}

pub fn check_failed(file: &str, errors: usize) -> String {
    format!(
        "{} {} ({} error{})",
        "FAILED".red().bold(),
        file,
        errors,
        if errors == 1 { "" } else { "s" }
    )
}
