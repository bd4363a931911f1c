//! Parser for the analyzed Go subset.
//!
//! Transforms a token stream into an abstract syntax tree.

mod parser;

pub use parser::{ParseError, ParseResult, Parser};

#[cfg(test)]
mod tests {
    use super::*;
    use resetlint_ast::decl::DeclKind;
    use resetlint_ast::stmt::{ElseBranch, StmtKind};

    fn parse(src: &str) -> ParseResult {
        let lex_result = resetlint_lexer::Lexer::new(src).tokenize();
        assert!(lex_result.is_ok(), "lex errors: {:?}", lex_result.errors);
        Parser::new(lex_result.tokens).parse()
    }

    fn parse_ok(src: &str) -> ParseResult {
        let result = parse(src);
        assert!(result.is_ok(), "parse errors: {:?}", result.errors);
        result
    }

    #[test]
    fn parse_package_clause() {
        let result = parse_ok("package pool\n");
        assert_eq!(result.package.as_deref(), Some("pool"));
        assert!(result.decls.is_empty());
    }

    #[test]
    fn parse_struct_with_fields() {
        let result = parse_ok(
            "package p\n\ntype people struct {\n\ta int\n\tb string\n\trc refcount\n}\n",
        );
        assert_eq!(result.decls.len(), 1);
        let DeclKind::Struct(s) = &result.decls[0].kind else {
            panic!("expected struct declaration");
        };
        assert_eq!(s.name, "people");
        assert_eq!(s.fields.len(), 3);
        assert_eq!(s.fields[0].names, vec!["a"]);
        assert_eq!(s.fields[2].ty.simple_name(), Some("refcount"));
    }

    #[test]
    fn parse_multi_name_field_group() {
        let result = parse_ok("type t struct {\n\tg, h []bool\n}\n");
        let DeclKind::Struct(s) = &result.decls[0].kind else {
            panic!("expected struct declaration");
        };
        assert_eq!(s.fields.len(), 1);
        assert_eq!(s.fields[0].names, vec!["g", "h"]);
    }

    #[test]
    fn parse_embedded_fields() {
        let result = parse_ok("type t struct {\n\trefcount\n\tsync.Mutex\n\t*buffer\n}\n");
        let DeclKind::Struct(s) = &result.decls[0].kind else {
            panic!("expected struct declaration");
        };
        assert_eq!(s.fields.len(), 3);
        assert!(s.fields.iter().all(|f| f.names.is_empty()));
        assert_eq!(s.fields[0].ty.simple_name(), Some("refcount"));
        assert_eq!(s.fields[1].ty.simple_name(), Some("Mutex"));
        assert_eq!(s.fields[2].ty.simple_name(), None);
    }

    #[test]
    fn parse_method_with_pointer_receiver() {
        let result = parse_ok("func (p *people) Reset() {\n\tp.a = 0\n}\n");
        let DeclKind::Func(f) = &result.decls[0].kind else {
            panic!("expected func declaration");
        };
        assert_eq!(f.name, "Reset");
        let recv = f.receiver.as_ref().expect("receiver");
        assert_eq!(recv.name.as_deref(), Some("p"));
        assert_eq!(recv.ty.deref_once().simple_name(), Some("people"));
        assert_eq!(f.body.len(), 1);
    }

    #[test]
    fn parse_anonymous_receiver() {
        let result = parse_ok("func (*people) Close() {}\n");
        let DeclKind::Func(f) = &result.decls[0].kind else {
            panic!("expected func declaration");
        };
        assert!(f.receiver.as_ref().unwrap().name.is_none());
    }

    #[test]
    fn parse_free_function() {
        let result = parse_ok("func clear(m map[string]int) {\n}\n");
        let DeclKind::Func(f) = &result.decls[0].kind else {
            panic!("expected func declaration");
        };
        assert!(f.receiver.is_none());
        assert_eq!(f.params.len(), 1);
    }

    #[test]
    fn parse_if_else_chain() {
        let result = parse_ok(
            "func (p *t) Reset() {\n\tif p.a > 0 {\n\t\tp.a = 0\n\t} else if p.b != nil {\n\t\tp.b = nil\n\t} else {\n\t\tp.c = \"\"\n\t}\n}\n",
        );
        let DeclKind::Func(f) = &result.decls[0].kind else {
            panic!("expected func declaration");
        };
        let StmtKind::If { else_branch, .. } = &f.body[0].kind else {
            panic!("expected if statement");
        };
        let Some(ElseBranch::If(nested)) = else_branch else {
            panic!("expected else-if");
        };
        let StmtKind::If { else_branch: inner_else, .. } = &nested.kind else {
            panic!("expected nested if");
        };
        assert!(matches!(inner_else, Some(ElseBranch::Block(_))));
    }

    #[test]
    fn parse_range_and_delete() {
        let result = parse_ok(
            "func (p *t) Reset() {\n\tfor key := range p.d {\n\t\tdelete(p.d, key)\n\t}\n}\n",
        );
        let DeclKind::Func(f) = &result.decls[0].kind else {
            panic!("expected func declaration");
        };
        let StmtKind::Range { key, body, .. } = &f.body[0].kind else {
            panic!("expected range statement");
        };
        assert_eq!(key.as_deref(), Some("key"));
        assert!(matches!(body[0].kind, StmtKind::Expr(_)));
    }

    #[test]
    fn parse_three_clause_for() {
        let result = parse_ok(
            "func (p *t) Reset() {\n\tfor i := 0; i < len(p.g); i++ {\n\t\tp.g[i] = false\n\t}\n}\n",
        );
        let DeclKind::Func(f) = &result.decls[0].kind else {
            panic!("expected func declaration");
        };
        let StmtKind::For { init, cond, post, body } = &f.body[0].kind else {
            panic!("expected for statement");
        };
        assert!(init.is_some());
        assert!(cond.is_some());
        assert!(post.is_some());
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn parse_reslice_assignment() {
        let result = parse_ok("func (p *t) Reset() {\n\tp.c = p.c[:0]\n}\n");
        let DeclKind::Func(f) = &result.decls[0].kind else {
            panic!("expected func declaration");
        };
        let StmtKind::Assign { targets, values, .. } = &f.body[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(targets.len(), 1);
        assert!(matches!(
            values[0].kind,
            resetlint_ast::expr::ExprKind::Slice { .. }
        ));
    }

    #[test]
    fn parse_multi_target_assignment() {
        let result = parse_ok("func (p *t) Reset() {\n\tp.a, p.b = 0, \"\"\n}\n");
        let DeclKind::Func(f) = &result.decls[0].kind else {
            panic!("expected func declaration");
        };
        let StmtKind::Assign { targets, values, define } = &f.body[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(targets.len(), 2);
        assert_eq!(values.len(), 2);
        assert!(!define);
    }

    #[test]
    fn parse_grouped_imports() {
        let result = parse_ok("import (\n\t\"fmt\"\n\ts \"strings\"\n)\n");
        assert_eq!(result.decls.len(), 2);
        let DeclKind::Import(i) = &result.decls[1].kind else {
            panic!("expected import");
        };
        assert_eq!(i.path, "strings");
        assert_eq!(i.alias.as_deref(), Some("s"));
    }

    #[test]
    fn parse_switch_cases() {
        let result = parse_ok(
            "func (p *t) Reset() {\n\tswitch p.kind {\n\tcase 1:\n\t\tp.a = 0\n\tdefault:\n\t\tp.b = nil\n\t}\n}\n",
        );
        let DeclKind::Func(f) = &result.decls[0].kind else {
            panic!("expected func declaration");
        };
        let StmtKind::Switch { tag, cases } = &f.body[0].kind else {
            panic!("expected switch statement");
        };
        assert!(tag.is_some());
        assert_eq!(cases.len(), 2);
        assert!(cases[1].exprs.is_empty());
    }

    #[test]
    fn parse_if_with_init_stmt() {
        let result = parse_ok(
            "func (p *t) Reset() {\n\tif v, ok := p.m[\"k\"]; ok {\n\t\tp.a = v\n\t}\n}\n",
        );
        let DeclKind::Func(f) = &result.decls[0].kind else {
            panic!("expected func declaration");
        };
        assert!(matches!(f.body[0].kind, StmtKind::If { .. }));
    }

    #[test]
    fn parse_error_recovers_to_next_decl() {
        let result = parse("type 123 struct {}\n\nfunc ok() {}\n");
        assert!(!result.is_ok());
        assert!(result
            .decls
            .iter()
            .any(|d| matches!(&d.kind, DeclKind::Func(f) if f.name == "ok")));
    }

    #[test]
    fn parse_composite_literal_values() {
        let result = parse_ok(
            "func (p *t) Reset() {\n\tp.m = map[string]int{}\n\tp.s = []byte{}\n\tp.o = thing{}\n}\n",
        );
        let DeclKind::Func(f) = &result.decls[0].kind else {
            panic!("expected func declaration");
        };
        assert_eq!(f.body.len(), 3);
    }
}
