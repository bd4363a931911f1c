// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Resolution of selector chains back to receiver fields.

use resetlint_ast::expr::{Expr, ExprKind};

/// Resolve an expression to the field it selects directly on the
/// receiver, if any.
///
/// Descends the selector chain toward its root and returns the field
/// name applied to the receiver identifier itself, so `p.a.b.c` and
/// `p.a[i].b` both resolve to `a`. Index and slice layers are
/// transparent. Expressions not rooted at the receiver resolve to
/// nothing.
pub fn field_of_receiver(expr: &Expr, receiver: &str) -> Option<String> {
    match &expr.kind {
        ExprKind::Selector { object, field } => {
            if is_receiver(object, receiver) {
                Some(field.clone())
            } else {
                field_of_receiver(object, receiver)
            }
        }
        ExprKind::Index { object, .. } | ExprKind::Slice { object, .. } => {
            field_of_receiver(object, receiver)
        }
        _ => None,
    }
}

fn is_receiver(expr: &Expr, receiver: &str) -> bool {
    matches!(&expr.kind, ExprKind::Ident(name) if name == receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(src: &str) -> Expr {
        let lex_result = resetlint_lexer::Lexer::new(src).tokenize();
        assert!(lex_result.is_ok());
        let mut parser = resetlint_parser::Parser::new(lex_result.tokens);
        parser.parse_expr().expect("expression")
    }

    #[test]
    fn direct_field() {
        assert_eq!(field_of_receiver(&expr("p.a"), "p").as_deref(), Some("a"));
    }

    #[test]
    fn nested_chain_resolves_to_root_field() {
        assert_eq!(
            field_of_receiver(&expr("p.a.b.c"), "p").as_deref(),
            Some("a")
        );
    }

    #[test]
    fn index_and_slice_are_transparent() {
        assert_eq!(
            field_of_receiver(&expr("p.g[i]"), "p").as_deref(),
            Some("g")
        );
        assert_eq!(
            field_of_receiver(&expr("p.c[1:2].x"), "p").as_deref(),
            Some("c")
        );
    }

    #[test]
    fn other_roots_do_not_resolve() {
        assert_eq!(field_of_receiver(&expr("q.a"), "p"), None);
        assert_eq!(field_of_receiver(&expr("local"), "p"), None);
        assert_eq!(field_of_receiver(&expr("f().a"), "p"), None);
    }

    #[test]
    fn bare_receiver_is_not_a_field() {
        assert_eq!(field_of_receiver(&expr("p"), "p"), None);
    }
}
