// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Coverage walk over a `Reset` method body.
//!
//! Collects the set of receiver fields a method body assigns, flow
//! insensitively: a field cleared on any branch counts as covered.

use std::collections::HashSet;

use resetlint_ast::expr::{Expr, ExprKind};
use resetlint_ast::stmt::{ElseBranch, Stmt, StmtKind};

use crate::catalog::Catalog;
use crate::resolve::field_of_receiver;

/// Walks a method body and records which receiver fields it covers.
pub struct CoverageWalker<'a> {
    catalog: &'a Catalog<'a>,
    type_name: &'a str,
    covered: HashSet<String>,
    /// Helper methods already expanded, so recursive helpers terminate.
    visited: HashSet<&'a str>,
}

impl<'a> CoverageWalker<'a> {
    pub fn new(catalog: &'a Catalog<'a>, type_name: &'a str) -> Self {
        Self {
            catalog,
            type_name,
            covered: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    /// Walk the method and return the covered field names.
    ///
    /// A method with an anonymous receiver covers nothing.
    pub fn run(mut self, method: &'a resetlint_ast::decl::FuncDecl) -> HashSet<String> {
        if let Some(receiver) = method.receiver.as_ref().and_then(|r| r.name.as_deref()) {
            self.walk_func(method, receiver);
        }
        self.covered
    }

    fn walk_func(&mut self, func: &'a resetlint_ast::decl::FuncDecl, receiver: &str) {
        if !self.visited.insert(func.name.as_str()) {
            return;
        }
        for stmt in &func.body {
            self.walk_stmt(stmt, receiver);
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt, receiver: &str) {
        match &stmt.kind {
            StmtKind::Assign { targets, .. } => {
                // Only the first target of a multi-assignment is inspected.
                if let Some(first) = targets.first() {
                    if let Some(field) = field_of_receiver(first, receiver) {
                        self.covered.insert(field);
                    }
                }
            }
            StmtKind::Expr(expr) => self.walk_call(expr, receiver),
            StmtKind::If { then_body, else_branch, .. } => {
                self.walk_body(then_body, receiver);
                match else_branch {
                    Some(ElseBranch::Block(body)) => self.walk_body(body, receiver),
                    Some(ElseBranch::If(nested)) => self.walk_stmt(nested, receiver),
                    None => {}
                }
            }
            StmtKind::For { body, .. } | StmtKind::Range { body, .. } => {
                // Loop headers are not inspected, only bodies.
                self.walk_body(body, receiver);
            }
            StmtKind::Switch { cases, .. } => {
                for case in cases {
                    self.walk_body(&case.body, receiver);
                }
            }
            StmtKind::Block(body) => self.walk_body(body, receiver),
            // Increments, declarations, returns and the rest never
            // clear a field.
            _ => {}
        }
    }

    fn walk_body(&mut self, body: &[Stmt], receiver: &str) {
        for stmt in body {
            self.walk_stmt(stmt, receiver);
        }
    }

    /// Handle an expression statement that may be a call.
    ///
    /// A call on the receiver itself (`p.helper()`) expands the helper
    /// method's body under the same receiver name, so a helper bound to
    /// a different receiver identifier contributes nothing. A call on a
    /// field (`p.f.Reset()`) is trusted to clear that field. A plain
    /// function call (`delete(p.d, key)`) marks its receiver rooted
    /// arguments and scans nested call arguments, but the callee body
    /// is never expanded. Anything else contributes nothing.
    fn walk_call(&mut self, expr: &Expr, receiver: &str) {
        let ExprKind::Call { func, args } = &expr.kind else {
            return;
        };

        match &func.kind {
            ExprKind::Ident(_) => {
                for arg in args {
                    if matches!(arg.kind, ExprKind::Call { .. }) {
                        self.walk_call(arg, receiver);
                    } else if let Some(field) = field_of_receiver(arg, receiver) {
                        self.covered.insert(field);
                    }
                }
            }
            ExprKind::Selector { object, field: method } => {
                if matches!(&object.kind, ExprKind::Ident(name) if name == receiver) {
                    if let Some(helper) = self.catalog.method(self.type_name, method) {
                        self.walk_func(helper, receiver);
                    }
                    return;
                }

                if let Some(field) = field_of_receiver(object, receiver) {
                    self.covered.insert(field);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resetlint_ast::decl::Decl;

    fn parse(src: &str) -> Vec<Decl> {
        let lex_result = resetlint_lexer::Lexer::new(src).tokenize();
        assert!(lex_result.is_ok());
        let result = resetlint_parser::Parser::new(lex_result.tokens).parse();
        assert!(result.is_ok(), "parse errors: {:?}", result.errors);
        result.decls
    }

    fn covered(src: &str, type_name: &str) -> HashSet<String> {
        let decls = parse(src);
        let catalog = Catalog::build(&decls);
        let method = catalog.method(type_name, "Reset").expect("Reset method");
        CoverageWalker::new(&catalog, type_name).run(method)
    }

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plain_assignments_cover() {
        let c = covered(
            "func (p *t) Reset() {\n\tp.a = 0\n\tp.b = \"\"\n\tp.c = nil\n}\n",
            "t",
        );
        assert_eq!(c, set(&["a", "b", "c"]));
    }

    #[test]
    fn first_target_only_in_multi_assignment() {
        let c = covered("func (p *t) Reset() {\n\tp.a, p.b = 0, \"\"\n}\n", "t");
        assert_eq!(c, set(&["a"]));
    }

    #[test]
    fn nested_selector_covers_root_field() {
        let c = covered("func (p *t) Reset() {\n\tp.a.inner = 0\n}\n", "t");
        assert_eq!(c, set(&["a"]));
    }

    #[test]
    fn increment_does_not_cover() {
        let c = covered("func (p *t) Reset() {\n\tp.a++\n}\n", "t");
        assert!(c.is_empty());
    }

    #[test]
    fn branches_union() {
        let c = covered(
            "func (p *t) Reset() {\n\tif p.a > 0 {\n\t\tp.a = 0\n\t} else if p.b != nil {\n\t\tp.b = nil\n\t} else {\n\t\tp.c = \"\"\n\t}\n}\n",
            "t",
        );
        assert_eq!(c, set(&["a", "b", "c"]));
    }

    #[test]
    fn loop_and_switch_bodies_covered() {
        let c = covered(
            "func (p *t) Reset() {\n\tfor i := 0; i < 8; i++ {\n\t\tp.g[i] = false\n\t}\n\tswitch p.kind {\n\tcase 1:\n\t\tp.a = 0\n\tdefault:\n\t\tp.b = nil\n\t}\n}\n",
            "t",
        );
        assert_eq!(c, set(&["g", "a", "b"]));
    }

    #[test]
    fn helper_method_expands() {
        let c = covered(
            "func (p *t) Reset() {\n\tp.a = 0\n\tp.clearRest()\n}\nfunc (p *t) clearRest() {\n\tp.b = nil\n\tp.c = \"\"\n}\n",
            "t",
        );
        assert_eq!(c, set(&["a", "b", "c"]));
    }

    #[test]
    fn helper_with_different_receiver_name_covers_nothing() {
        // The helper body is walked under the caller's receiver name,
        // so writes through its own `q` binding do not resolve.
        let c = covered(
            "func (p *t) Reset() {\n\tp.clearRest()\n}\nfunc (q *t) clearRest() {\n\tq.b = nil\n}\n",
            "t",
        );
        assert!(c.is_empty());
    }

    #[test]
    fn recursive_helpers_terminate() {
        let c = covered(
            "func (p *t) Reset() {\n\tp.clearA()\n}\nfunc (p *t) clearA() {\n\tp.a = 0\n\tp.clearB()\n}\nfunc (p *t) clearB() {\n\tp.b = nil\n\tp.clearA()\n}\n",
            "t",
        );
        assert_eq!(c, set(&["a", "b"]));
    }

    #[test]
    fn field_reset_call_trusts_the_field() {
        let c = covered("func (p *t) Reset() {\n\tp.f.Reset()\n}\n", "t");
        assert_eq!(c, set(&["f"]));
    }

    #[test]
    fn map_delete_covers_the_map_field() {
        let c = covered(
            "func (p *t) Reset() {\n\tfor k := range p.d {\n\t\tdelete(p.d, k)\n\t}\n}\n",
            "t",
        );
        assert_eq!(c, set(&["d"]));
    }

    #[test]
    fn nested_call_arguments_are_scanned() {
        let c = covered(
            "func (p *t) Reset() {\n\tfill(wrap(p.buf), 0)\n}\n",
            "t",
        );
        assert_eq!(c, set(&["buf"]));
    }

    #[test]
    fn unresolved_calls_cover_nothing() {
        let c = covered(
            "func (p *t) Reset() {\n\tclearAll(p)\n\tother.Reset()\n\tp.missingHelper()\n}\n",
            "t",
        );
        assert!(c.is_empty());
    }

    #[test]
    fn helper_on_other_type_not_expanded() {
        let c = covered(
            "func (p *t) Reset() {\n\tp.clear()\n}\nfunc (u *other) clear() {\n\tu.a = 0\n}\n",
            "t",
        );
        assert!(c.is_empty());
    }

    #[test]
    fn local_assignments_ignored() {
        let c = covered(
            "func (p *t) Reset() {\n\tx := 0\n\tx = 1\n\tvar y int\n\ty = 2\n\tp.a = y\n}\n",
            "t",
        );
        assert_eq!(c, set(&["a"]));
    }
}
