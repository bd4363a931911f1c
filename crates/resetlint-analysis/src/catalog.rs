// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Symbol catalog over a parsed file.
//!
//! Indexes struct declarations, methods keyed by receiver type, and free
//! functions, so the coverage walker can look up helper bodies by name.

use std::collections::HashMap;

use resetlint_ast::decl::{Decl, DeclKind, FuncDecl, StructDecl};

/// The field type name that marks a struct as reference counted.
pub const MARKER_TYPE: &str = "refcount";

/// Symbol tables for one parsed file.
///
/// Structs keep their declaration order so reports are deterministic.
pub struct Catalog<'a> {
    pub structs: Vec<&'a StructDecl>,
    /// Method tables, outer key the receiver type, inner the method name.
    methods: HashMap<&'a str, HashMap<&'a str, &'a FuncDecl>>,
    functions: HashMap<&'a str, &'a FuncDecl>,
}

impl<'a> Catalog<'a> {
    pub fn build(decls: &'a [Decl]) -> Self {
        let mut structs = Vec::new();
        let mut methods: HashMap<&str, HashMap<&str, &FuncDecl>> = HashMap::new();
        let mut functions = HashMap::new();

        for decl in decls {
            match &decl.kind {
                DeclKind::Struct(s) => structs.push(s),
                DeclKind::Func(f) => match &f.receiver {
                    Some(recv) => {
                        // Methods with anonymous receivers cannot touch any
                        // field, so they are not indexed.
                        if recv.name.is_none() {
                            continue;
                        }
                        if let Some(ty) = recv.ty.deref_once().simple_name() {
                            methods.entry(ty).or_default().insert(f.name.as_str(), f);
                        }
                    }
                    None => {
                        functions.insert(f.name.as_str(), f);
                    }
                },
                _ => {}
            }
        }

        Self { structs, methods, functions }
    }

    /// Look up a method by receiver type and name.
    pub fn method(&self, type_name: &str, name: &str) -> Option<&'a FuncDecl> {
        self.methods.get(type_name).and_then(|table| table.get(name)).copied()
    }

    /// Look up a free function by name.
    pub fn function(&self, name: &str) -> Option<&'a FuncDecl> {
        self.functions.get(name).copied()
    }
}

/// The marker field's type position, if the struct carries one.
///
/// The marker is a field whose type is written as a plain or
/// package-qualified name spelling `refcount`, compared case
/// insensitively. Pointer, slice and other composed type forms never
/// match, even when the name appears inside them.
pub fn marker_span(s: &StructDecl) -> Option<resetlint_ast::Span> {
    s.fields.iter().find(|f| is_marker_field(f)).map(|f| f.ty.span)
}

/// Whether a struct carries the reference count marker.
pub fn has_marker(s: &StructDecl) -> bool {
    marker_span(s).is_some()
}

fn is_marker_field(field: &resetlint_ast::decl::Field) -> bool {
    field
        .ty
        .simple_name()
        .is_some_and(|name| name.eq_ignore_ascii_case(MARKER_TYPE))
}

/// The required field names for a marked struct, in declaration order.
///
/// Multi-name entries contribute each name separately. Embedded fields
/// have no name to assign to and are not required; the conventional
/// embedded `refcount` marker is exempt for the same reason, while a
/// named marker field is required like any other.
pub fn required_fields(s: &StructDecl) -> Vec<(&str, resetlint_ast::Span)> {
    let mut required = Vec::new();
    for field in &s.fields {
        for name in &field.names {
            required.push((name.as_str(), field.span));
        }
    }
    required
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Vec<Decl> {
        let lex_result = resetlint_lexer::Lexer::new(src).tokenize();
        assert!(lex_result.is_ok());
        let result = resetlint_parser::Parser::new(lex_result.tokens).parse();
        assert!(result.is_ok(), "parse errors: {:?}", result.errors);
        result.decls
    }

    #[test]
    fn indexes_methods_by_receiver_type() {
        let decls = parse(
            "type a struct {}\nfunc (p *a) Reset() {}\nfunc (p a) other() {}\nfunc free() {}\n",
        );
        let catalog = Catalog::build(&decls);
        assert!(catalog.method("a", "Reset").is_some());
        assert!(catalog.method("a", "other").is_some());
        assert!(catalog.method("a", "free").is_none());
        assert!(catalog.function("free").is_some());
    }

    #[test]
    fn anonymous_receiver_not_indexed() {
        let decls = parse("func (*a) Reset() {}\n");
        let catalog = Catalog::build(&decls);
        assert!(catalog.method("a", "Reset").is_none());
    }

    #[test]
    fn marker_detection_is_case_insensitive() {
        let decls = parse("type a struct {\n\trc RefCount\n}\n");
        let catalog = Catalog::build(&decls);
        assert!(has_marker(catalog.structs[0]));
    }

    #[test]
    fn marker_matches_embedded_and_qualified_forms() {
        let decls = parse(
            "type a struct {\n\trefcount\n}\ntype b struct {\n\tr util.refcount\n}\ntype c struct {\n\tr *refcount\n}\ntype d struct {\n\trs []refcount\n}\n",
        );
        let catalog = Catalog::build(&decls);
        assert!(has_marker(catalog.structs[0]));
        assert!(has_marker(catalog.structs[1]));
        assert!(!has_marker(catalog.structs[2]));
        assert!(!has_marker(catalog.structs[3]));
    }

    #[test]
    fn required_fields_flatten_groups_and_skip_embedded() {
        let decls = parse(
            "type a struct {\n\trefcount\n\tx int\n\tg, h []bool\n\tsync.Mutex\n}\n",
        );
        let catalog = Catalog::build(&decls);
        let names: Vec<&str> = required_fields(catalog.structs[0])
            .iter()
            .map(|(n, _)| *n)
            .collect();
        assert_eq!(names, vec!["x", "g", "h"]);
    }

    #[test]
    fn named_marker_field_is_still_required() {
        let decls = parse("type a struct {\n\trc refcount\n}\n");
        let catalog = Catalog::build(&decls);
        let names: Vec<&str> = required_fields(catalog.structs[0])
            .iter()
            .map(|(n, _)| *n)
            .collect();
        assert_eq!(names, vec!["rc"]);
    }
}
