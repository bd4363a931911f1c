//! Statement AST nodes.

use crate::expr::Expr;
use crate::ty::TypeExpr;
use crate::Span;

/// A statement in the AST.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Expression statement
    Expr(Expr),
    /// Assignment or short variable declaration.
    ///
    /// Compound assignments (`x += 1`) are folded into this form with a
    /// single target and the right-hand side as written.
    Assign {
        targets: Vec<Expr>,
        values: Vec<Expr>,
        define: bool,
    },
    /// Increment/decrement statement (`x++`, `x--`)
    IncDec {
        target: Expr,
        inc: bool,
    },
    /// Local variable declaration
    Var {
        names: Vec<String>,
        ty: Option<TypeExpr>,
        values: Vec<Expr>,
    },
    /// If statement
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_branch: Option<ElseBranch>,
    },
    /// For loop; covers `for {}`, `for cond {}` and the three-clause form
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Vec<Stmt>,
    },
    /// Range loop (`for k, v := range x {}`)
    Range {
        key: Option<String>,
        value: Option<String>,
        define: bool,
        expr: Expr,
        body: Vec<Stmt>,
    },
    /// Switch statement
    Switch {
        tag: Option<Expr>,
        cases: Vec<SwitchCase>,
    },
    /// Return statement
    Return(Vec<Expr>),
    /// Defer statement
    Defer(Expr),
    /// Go statement
    Go(Expr),
    /// Break statement
    Break(Option<String>),
    /// Continue statement
    Continue(Option<String>),
    /// Bare nested block
    Block(Vec<Stmt>),
}

/// The `else` arm of an if statement.
#[derive(Debug, Clone)]
pub enum ElseBranch {
    /// `else { ... }`
    Block(Vec<Stmt>),
    /// `else if ...`
    If(Box<Stmt>),
}

/// One arm of a switch statement. An empty expression list is `default`.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub exprs: Vec<Expr>,
    pub body: Vec<Stmt>,
}
