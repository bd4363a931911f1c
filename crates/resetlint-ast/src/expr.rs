// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.

use crate::ty::TypeExpr;
use crate::Span;

/// An expression in the AST.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal
    String(String),
    /// Rune literal
    Rune(char),
    /// Boolean literal
    Bool(bool),
    /// The `nil` literal
    Nil,
    /// Identifier
    Ident(String),
    /// Selector (`x.f`)
    Selector {
        object: Box<Expr>,
        field: String,
    },
    /// Index access (`x[i]`)
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// Slice access (`x[lo:hi]`, `x[:0]`)
    Slice {
        object: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
    },
    /// Function or method call
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Composite literal (`People{}`, `[]int{1, 2}`, `map[string]int{}`)
    Composite {
        ty: TypeExpr,
        elts: Vec<Expr>,
    },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    AndNot,
    Shl,
    Shr,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical not (!)
    Not,
    /// Bitwise complement (^)
    BitNot,
    /// Address-of (&)
    Ref,
    /// Dereference (*)
    Deref,
    /// Channel receive (<-)
    Recv,
}
