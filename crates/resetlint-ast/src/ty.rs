// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type expression AST nodes.

use crate::Span;

/// A type expression as written in a declaration.
#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

/// The kind of type expression.
#[derive(Debug, Clone)]
pub enum TypeExprKind {
    /// A plain type name (`int`, `refcount`, `People`)
    Name(String),
    /// A package-qualified type name (`sync.Mutex`)
    Qualified { pkg: String, name: String },
    /// Pointer type (`*T`)
    Pointer(Box<TypeExpr>),
    /// Slice type (`[]T`)
    Slice(Box<TypeExpr>),
    /// Array type (`[N]T`); the length is not retained
    Array(Box<TypeExpr>),
    /// Map type (`map[K]V`)
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// Channel type (`chan T`)
    Chan(Box<TypeExpr>),
    /// Empty interface (`interface{}`)
    Interface,
}

impl TypeExpr {
    /// The simple name of a named type, if this is one.
    ///
    /// Only plain and package-qualified names have a simple name;
    /// pointers, slices, maps and the rest do not.
    pub fn simple_name(&self) -> Option<&str> {
        match &self.kind {
            TypeExprKind::Name(name) => Some(name),
            TypeExprKind::Qualified { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Unwrap a single level of pointer indirection.
    pub fn deref_once(&self) -> &TypeExpr {
        match &self.kind {
            TypeExprKind::Pointer(inner) => inner,
            _ => self,
        }
    }
}
