// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Reset completeness check for reference counted Go structs.
//!
//! A struct that declares a `refcount` field participates in pooled
//! reuse, so its `Reset` method must return every field to the zero
//! value before the object goes back to the pool. This crate parses a
//! Go source file and reports structs whose `Reset` misses a field, or
//! that have no `Reset` at all.

pub mod catalog;
pub mod report;
pub mod resolve;
pub mod types;
pub mod walker;
mod util;

pub use types::{CheckReport, Severity};

/// Parse source and run the reset check.
///
/// Declarations recovered from a file with parse errors are still
/// checked.
pub fn check(source: &str, file: &str) -> CheckReport {
    let mut lexer = resetlint_lexer::Lexer::new(source);
    let lex_result = lexer.tokenize();
    let mut parser = resetlint_parser::Parser::new(lex_result.tokens);
    let parse_result = parser.parse();

    let diagnostics = report::run_check(&parse_result.decls, source);

    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    CheckReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        diagnostics,
        error_count,
        warning_count,
    }
}

/// Serialize a check report to JSON.
pub fn check_json(report: &CheckReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOLED: &str = include_str!("../testdata/people_reset.go");

    #[test]
    fn complete_reset_passes() {
        let report = check(POOLED, "people_reset.go");
        assert!(report.success, "diagnostics: {:?}", report.diagnostics);
        assert_eq!(report.error_count, 0);
    }

    #[test]
    fn missing_field_is_reported() {
        let src = "\
package pool

type item struct {
	refcount
	a int
	b string
}

func (p *item) Reset() {
	p.a = 0
}
";
        let report = check(src, "item.go");
        assert!(!report.success);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 0);
        let diag = &report.diagnostics[0];
        assert_eq!(diag.rule, "reset/uncovered-field");
        assert!(diag.message.contains("`b`"), "message: {}", diag.message);
        assert_eq!(diag.location.line, 6);
    }

    #[test]
    fn missing_reset_method_is_reported() {
        let src = "package pool\n\ntype item struct {\n\trefcount\n\ta int\n}\n";
        let report = check(src, "item.go");
        assert!(!report.success);
        assert_eq!(report.diagnostics[0].rule, "reset/missing-method");
        // Anchored at the marker field itself
        assert_eq!(report.diagnostics[0].location.line, 4);
        assert_eq!(report.diagnostics[0].location.source_line, "\trefcount");
    }

    #[test]
    fn unmarked_struct_is_ignored() {
        let src = "package pool\n\ntype plain struct {\n\ta int\n}\n";
        let report = check(src, "plain.go");
        assert!(report.success);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn anonymous_receiver_reset_counts_as_missing() {
        let src = "\
package pool

type item struct {
	refcount
	a int
}

func (*item) Reset() {
}
";
        let report = check(src, "item.go");
        assert!(!report.success);
        assert_eq!(report.diagnostics[0].rule, "reset/missing-method");
    }

    #[test]
    fn diagnostics_follow_declaration_order() {
        let src = "\
package pool

type second struct {
	refcount
	x int
}

type first struct {
	refcount
	y int
}

func (p *second) Reset() {}

func (p *first) Reset() {}
";
        let report = check(src, "two.go");
        assert_eq!(report.diagnostics.len(), 2);
        assert!(report.diagnostics[0].message.contains("`second`"));
        assert!(report.diagnostics[1].message.contains("`first`"));
    }

    #[test]
    fn report_is_stable_across_runs() {
        let src = "\
package pool

type item struct {
	refcount
	a, b, c int
}

func (p *item) Reset() {
	p.b = 0
}
";
        let first = check_json(&check(src, "item.go"));
        let second = check_json(&check(src, "item.go"));
        assert_eq!(first, second);
        let report = check(src, "item.go");
        assert!(report.diagnostics[0].message.contains("`a`"));
        assert!(report.diagnostics[1].message.contains("`c`"));
    }

    #[test]
    fn decls_after_parse_error_still_checked() {
        let src = "\
package pool

type 1bad struct {}

type item struct {
	refcount
	a int
}
";
        let report = check(src, "item.go");
        assert!(!report.success);
        assert_eq!(report.diagnostics[0].rule, "reset/missing-method");
    }

    #[test]
    fn json_output_shape() {
        let src = "package pool\n\ntype item struct {\n\trefcount\n\ta int\n}\n";
        let json = check_json(&check(src, "item.go"));
        assert!(json.contains("\"version\": 1"));
        assert!(json.contains("\"rule\": \"reset/missing-method\""));
        assert!(json.contains("\"severity\": \"error\""));
    }
}
