// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The reset check itself: compare coverage against the field list.

use resetlint_ast::decl::Decl;
use resetlint_ast::Span;

use crate::catalog::{self, Catalog};
use crate::types::{CheckDiagnostic, CheckLocation, Severity};
use crate::util;
use crate::walker::CoverageWalker;

/// Run the reset check over a file's declarations.
///
/// For every struct carrying the `refcount` marker, verifies a `Reset`
/// method exists and covers every named field. Structs are visited in
/// declaration order, so output is stable across runs.
pub fn run_check(decls: &[Decl], source: &str) -> Vec<CheckDiagnostic> {
    let catalog = Catalog::build(decls);
    let mut diagnostics = Vec::new();

    for s in &catalog.structs {
        let Some(marker_span) = catalog::marker_span(s) else {
            continue;
        };

        let Some(reset) = catalog.method(&s.name, "Reset") else {
            diagnostics.push(make_diagnostic(
                "reset/missing-method",
                Severity::Error,
                format!(
                    "struct `{}` has a `refcount` field but no `Reset` method",
                    s.name
                ),
                format!("declare `func (p *{}) Reset()` and clear every field", s.name),
                source,
                marker_span,
            ));
            continue;
        };

        let covered = CoverageWalker::new(&catalog, &s.name).run(reset);
        for (name, span) in catalog::required_fields(s) {
            if !covered.contains(name) {
                diagnostics.push(make_diagnostic(
                    "reset/uncovered-field",
                    Severity::Error,
                    format!("struct `{}` field `{}` is not cleared by `Reset`", s.name, name),
                    format!("clear `{}` in the `Reset` method", name),
                    source,
                    span,
                ));
            }
        }
    }

    diagnostics
}

fn make_diagnostic(
    rule: &str,
    severity: Severity,
    message: String,
    fix: String,
    source: &str,
    span: Span,
) -> CheckDiagnostic {
    let (line, column) = util::line_col(source, span.start);
    let source_line = util::get_source_line(source, line);

    CheckDiagnostic {
        rule: rule.to_string(),
        severity,
        message,
        location: CheckLocation { line, column, source_line },
        fix,
    }
}
