// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Output types for the reset check.

use serde::Serialize;

/// Complete check report for a file.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub version: u32,
    pub file: String,
    pub success: bool,
    pub diagnostics: Vec<CheckDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// A single finding.
#[derive(Debug, Serialize)]
pub struct CheckDiagnostic {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub location: CheckLocation,
    pub fix: String,
}

/// Source location.
#[derive(Debug, Serialize)]
pub struct CheckLocation {
    pub line: usize,
    pub column: usize,
    pub source_line: String,
}

/// Severity level.
///
/// Both reset rules report at `Error`; `Warning` is part of the report
/// format for consumers but is not currently emitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}
