// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration AST nodes.

use crate::stmt::Stmt;
use crate::ty::TypeExpr;
use crate::Span;

/// A top-level declaration.
#[derive(Debug, Clone)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
}

/// The kind of declaration.
#[derive(Debug, Clone)]
pub enum DeclKind {
    /// Struct type declaration
    Struct(StructDecl),
    /// Function or method declaration
    Func(FuncDecl),
    /// Non-struct type declaration (`type Handle int`)
    TypeAlias {
        name: String,
        ty: TypeExpr,
    },
    /// Import declaration
    Import(ImportDecl),
    /// Top-level variable or constant declaration
    Var {
        names: Vec<String>,
        ty: Option<TypeExpr>,
    },
}

/// A struct type declaration.
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<Field>,
    pub span: Span,
}

/// A struct field entry.
///
/// One entry may declare several names (`a, b int`); embedded fields
/// have no names at all.
#[derive(Debug, Clone)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A function or method declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub receiver: Option<Receiver>,
    pub params: Vec<Param>,
    pub results: Vec<TypeExpr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A method receiver.
///
/// The binding name is absent for anonymous receivers
/// (`func (*People) Reset()`).
#[derive(Debug, Clone)]
pub struct Receiver {
    pub name: Option<String>,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A function parameter entry (may declare several names).
#[derive(Debug, Clone)]
pub struct Param {
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

/// An import declaration.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub path: String,
    pub alias: Option<String>,
}
