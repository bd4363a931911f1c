// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation using Pratt parsing for expressions.
//!
//! Parses the Go subset the analysis consumes: package clause, imports,
//! struct type declarations, function/method declarations, and the
//! statement forms the coverage walker understands. Newlines are
//! statement terminators, as in Go's semicolon insertion.

use resetlint_ast::decl::{Decl, DeclKind, Field, FuncDecl, ImportDecl, Param, Receiver, StructDecl};
use resetlint_ast::expr::{BinOp, Expr, ExprKind, UnaryOp};
use resetlint_ast::stmt::{ElseBranch, Stmt, StmtKind, SwitchCase};
use resetlint_ast::token::{Token, TokenKind};
use resetlint_ast::ty::{TypeExpr, TypeExprKind};
use resetlint_ast::Span;

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The parser for Go source code.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Controls whether `{` after a name starts a composite literal
    /// (false inside control flow headers, where `{` opens the body)
    allow_composite: bool,
    /// Collected errors during parsing
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, allow_composite: true, errors: Vec::new() }
    }

    /// Record error, return if should continue.
    fn record_error(&mut self, error: ParseError) -> bool {
        self.errors.push(error);
        self.errors.len() < MAX_ERRORS
    }

    /// Skip to next top-level declaration after error.
    fn synchronize(&mut self) {
        let mut brace_depth = 0;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if brace_depth > 0 {
                        brace_depth -= 1;
                        self.advance();
                        if brace_depth == 0 {
                            self.skip_newlines();
                            return;
                        }
                    } else {
                        self.advance();
                    }
                }
                TokenKind::Func | TokenKind::Type | TokenKind::Import
                | TokenKind::Var | TokenKind::Const if brace_depth == 0 => {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.tokens.get(self.pos + n).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        if !self.at_end() {
            self.pos += 1;
        }
        self.tokens.get(self.pos - 1).unwrap()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<&Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(
                kind.display_name(),
                self.current_kind(),
                self.current().span,
            ))
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) || self.check(&TokenKind::Semi) {
            self.advance();
        }
    }

    fn expect_terminator(&mut self) -> Result<(), ParseError> {
        if self.check(&TokenKind::Newline) || self.check(&TokenKind::Semi) {
            self.advance();
            self.skip_newlines();
            Ok(())
        } else if self.check(&TokenKind::Eof) || self.check(&TokenKind::RBrace) {
            Ok(())
        } else {
            Err(ParseError::expected(
                "newline or ';'",
                self.current_kind(),
                self.current().span,
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::expected(
                "a name",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::String(s) => {
                self.advance();
                Ok(s)
            }
            _ => Err(ParseError::expected(
                "a string",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    /// True if the current token can start a type expression.
    fn at_type_start(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Ident(_)
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Interface
        )
    }

    // =========================================================================
    // File and Declarations
    // =========================================================================

    pub fn parse(&mut self) -> ParseResult {
        let mut package = None;
        let mut decls = Vec::new();
        self.skip_newlines();

        if self.check(&TokenKind::Package) {
            match self.parse_package_clause() {
                Ok(name) => package = Some(name),
                Err(e) => {
                    self.record_error(e);
                    self.synchronize();
                }
            }
        }

        while !self.at_end() {
            match self.parse_decl() {
                Ok(mut batch) => decls.append(&mut batch),
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    self.synchronize();
                }
            }
            self.skip_newlines();
        }

        ParseResult {
            package,
            decls,
            errors: std::mem::take(&mut self.errors),
        }
    }

    fn parse_package_clause(&mut self) -> Result<String, ParseError> {
        self.expect(&TokenKind::Package)?;
        let name = self.expect_ident()?;
        self.expect_terminator()?;
        Ok(name)
    }

    /// Parse one declaration; grouped imports and type blocks expand to
    /// several.
    fn parse_decl(&mut self) -> Result<Vec<Decl>, ParseError> {
        match self.current_kind() {
            TokenKind::Import => self.parse_import_decl(),
            TokenKind::Type => self.parse_type_decl().map(|d| vec![d]),
            TokenKind::Func => self.parse_func_decl().map(|d| vec![d]),
            TokenKind::Var | TokenKind::Const => self.parse_var_decl().map(|d| vec![d]),
            _ => Err(ParseError::expected(
                "declaration (import, type, func, var, const)",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    fn parse_import_decl(&mut self) -> Result<Vec<Decl>, ParseError> {
        let start = self.current().span.start;
        self.expect(&TokenKind::Import)?;

        let mut decls = Vec::new();
        if self.match_token(&TokenKind::LParen) {
            self.skip_newlines();
            while !self.check(&TokenKind::RParen) && !self.at_end() {
                decls.push(self.parse_import_spec(start)?);
                self.skip_newlines();
            }
            self.expect(&TokenKind::RParen)?;
        } else {
            decls.push(self.parse_import_spec(start)?);
        }
        self.expect_terminator()?;
        Ok(decls)
    }

    fn parse_import_spec(&mut self, start: usize) -> Result<Decl, ParseError> {
        let alias = match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Some(name)
            }
            TokenKind::Dot => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };
        let path = self.expect_string()?;
        let end = self.tokens[self.pos - 1].span.end;
        Ok(Decl {
            kind: DeclKind::Import(ImportDecl { path, alias }),
            span: Span::new(start, end),
        })
    }

    fn parse_type_decl(&mut self) -> Result<Decl, ParseError> {
        let start = self.current().span.start;
        self.expect(&TokenKind::Type)?;
        let name = self.expect_ident()?;

        let kind = if self.check(&TokenKind::Struct) {
            let fields = self.parse_struct_body()?;
            let end = self.tokens[self.pos - 1].span.end;
            DeclKind::Struct(StructDecl { name, fields, span: Span::new(start, end) })
        } else {
            // `type Handle int`, `type Key = string` and similar
            self.match_token(&TokenKind::Eq);
            let ty = self.parse_type()?;
            DeclKind::TypeAlias { name, ty }
        };
        self.expect_terminator()?;

        let end = self.tokens[self.pos - 1].span.end;
        Ok(Decl { kind, span: Span::new(start, end) })
    }

    fn parse_struct_body(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect(&TokenKind::Struct)?;
        self.expect(&TokenKind::LBrace)?;
        self.skip_newlines();

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            fields.push(self.parse_field()?);
            self.skip_newlines();
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(fields)
    }

    /// Parse one field line: `a, b int`, an embedded `refcount`, or an
    /// embedded `*pkg.Type`. A trailing tag string is consumed and dropped.
    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let start = self.current().span.start;

        // Embedded pointer field
        if self.check(&TokenKind::Star) {
            let ty = self.parse_type()?;
            return self.finish_field(Vec::new(), ty, start);
        }

        let first = self.expect_ident()?;
        let first_span = self.tokens[self.pos - 1].span;

        // Embedded qualified field: `sync.Mutex`
        if self.match_token(&TokenKind::Dot) {
            let name = self.expect_ident()?;
            let end = self.tokens[self.pos - 1].span.end;
            let ty = TypeExpr {
                kind: TypeExprKind::Qualified { pkg: first, name },
                span: Span::new(first_span.start, end),
            };
            return self.finish_field(Vec::new(), ty, start);
        }

        // Embedded plain field: name followed by end of line or a tag
        if self.check(&TokenKind::Newline)
            || self.check(&TokenKind::Semi)
            || self.check(&TokenKind::RBrace)
            || self.check(&TokenKind::String(String::new()))
        {
            let ty = TypeExpr { kind: TypeExprKind::Name(first), span: first_span };
            return self.finish_field(Vec::new(), ty, start);
        }

        // Named field(s): collect remaining names, then the type
        let mut names = vec![first];
        while self.match_token(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        let ty = self.parse_type()?;
        self.finish_field(names, ty, start)
    }

    fn finish_field(&mut self, names: Vec<String>, ty: TypeExpr, start: usize) -> Result<Field, ParseError> {
        // Optional struct tag
        if self.check(&TokenKind::String(String::new())) {
            self.advance();
        }
        let end = self.tokens[self.pos - 1].span.end;
        self.expect_terminator()?;
        Ok(Field { names, ty, span: Span::new(start, end) })
    }

    fn parse_func_decl(&mut self) -> Result<Decl, ParseError> {
        let start = self.current().span.start;
        self.expect(&TokenKind::Func)?;

        let receiver = if self.check(&TokenKind::LParen) {
            Some(self.parse_receiver()?)
        } else {
            None
        };

        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(&TokenKind::RParen)?;
        let results = self.parse_results()?;

        let body = if self.check(&TokenKind::LBrace) {
            self.parse_block_body()?
        } else {
            Vec::new()
        };
        self.expect_terminator()?;

        let end = self.tokens[self.pos - 1].span.end;
        Ok(Decl {
            kind: DeclKind::Func(FuncDecl {
                name,
                receiver,
                params,
                results,
                body,
                span: Span::new(start, end),
            }),
            span: Span::new(start, end),
        })
    }

    /// Parse `(p *People)`, `(p People)`, `(*People)` or `(People)`.
    fn parse_receiver(&mut self) -> Result<Receiver, ParseError> {
        let start = self.current().span.start;
        self.expect(&TokenKind::LParen)?;

        let receiver = if self.check(&TokenKind::Star) {
            // Anonymous pointer receiver
            let ty = self.parse_type()?;
            Receiver { name: None, ty, span: Span::new(start, self.tokens[self.pos - 1].span.end) }
        } else {
            let first = self.expect_ident()?;
            let first_span = self.tokens[self.pos - 1].span;
            if self.check(&TokenKind::RParen) {
                // Anonymous value receiver: the lone name is the type
                let ty = TypeExpr { kind: TypeExprKind::Name(first), span: first_span };
                Receiver { name: None, ty, span: Span::new(start, first_span.end) }
            } else {
                let ty = self.parse_type()?;
                let end = self.tokens[self.pos - 1].span.end;
                Receiver { name: Some(first), ty, span: Span::new(start, end) }
            }
        };

        self.expect(&TokenKind::RParen)?;
        Ok(receiver)
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        self.skip_newlines();
        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            self.skip_newlines();
            let mut names = Vec::new();
            // A name is only a name if a type follows it; otherwise the
            // identifier itself is an unnamed parameter's type.
            while let TokenKind::Ident(_) = self.current_kind() {
                if self.type_follows_ident() {
                    names.push(self.expect_ident()?);
                    break;
                }
                if matches!(self.peek(1), TokenKind::Comma) && self.names_end_in_type() {
                    names.push(self.expect_ident()?);
                    self.expect(&TokenKind::Comma)?;
                    continue;
                }
                break;
            }
            let ty = if names.is_empty() && !self.at_type_start() {
                return Err(ParseError::expected("type", self.current_kind(), self.current().span));
            } else {
                self.parse_type()?
            };
            params.push(Param { names, ty });

            self.skip_newlines();
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
            if self.check(&TokenKind::RParen) {
                break;
            }
        }
        Ok(params)
    }

    /// True if the token after the current identifier starts a type.
    fn type_follows_ident(&self) -> bool {
        matches!(
            self.peek(1),
            TokenKind::Ident(_)
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Interface
        )
    }

    /// Look ahead over `a, b, c` to see whether the run of comma-separated
    /// identifiers ends in a type (making the identifiers names).
    fn names_end_in_type(&self) -> bool {
        let mut i = 0;
        loop {
            match self.peek(i) {
                TokenKind::Ident(_) => match self.peek(i + 1) {
                    TokenKind::Comma => i += 2,
                    TokenKind::Ident(_)
                    | TokenKind::Star
                    | TokenKind::LBracket
                    | TokenKind::Map
                    | TokenKind::Chan
                    | TokenKind::Interface => return true,
                    _ => return false,
                },
                _ => return false,
            }
        }
    }

    fn parse_results(&mut self) -> Result<Vec<TypeExpr>, ParseError> {
        let mut results = Vec::new();
        if self.match_token(&TokenKind::LParen) {
            self.skip_newlines();
            while !self.check(&TokenKind::RParen) && !self.at_end() {
                // Optional result name
                if matches!(self.current_kind(), TokenKind::Ident(_)) && self.type_follows_ident() {
                    self.advance();
                }
                results.push(self.parse_type()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
                self.skip_newlines();
            }
            self.expect(&TokenKind::RParen)?;
        } else if self.at_type_start() {
            results.push(self.parse_type()?);
        }
        Ok(results)
    }

    fn parse_var_decl(&mut self) -> Result<Decl, ParseError> {
        let start = self.current().span.start;
        self.advance(); // var or const

        // Grouped form: consume the parenthesized block without modeling it
        if self.match_token(&TokenKind::LParen) {
            let mut depth = 1;
            while depth > 0 && !self.at_end() {
                match self.current_kind() {
                    TokenKind::LParen => depth += 1,
                    TokenKind::RParen => depth -= 1,
                    _ => {}
                }
                self.advance();
            }
            self.expect_terminator()?;
            let end = self.tokens[self.pos - 1].span.end;
            return Ok(Decl {
                kind: DeclKind::Var { names: Vec::new(), ty: None },
                span: Span::new(start, end),
            });
        }

        let mut names = vec![self.expect_ident()?];
        while self.match_token(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        let ty = if self.at_type_start() && !self.check(&TokenKind::Newline) {
            Some(self.parse_type()?)
        } else {
            None
        };
        if self.match_token(&TokenKind::Eq) {
            loop {
                self.parse_expr()?;
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_terminator()?;
        let end = self.tokens[self.pos - 1].span.end;
        Ok(Decl { kind: DeclKind::Var { names, ty }, span: Span::new(start, end) })
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.current().span.start;
        let kind = match self.current_kind().clone() {
            TokenKind::Star => {
                self.advance();
                TypeExprKind::Pointer(Box::new(self.parse_type()?))
            }
            TokenKind::LBracket => {
                self.advance();
                if self.match_token(&TokenKind::RBracket) {
                    TypeExprKind::Slice(Box::new(self.parse_type()?))
                } else {
                    // Array length is parsed and dropped
                    self.parse_expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    TypeExprKind::Array(Box::new(self.parse_type()?))
                }
            }
            TokenKind::Map => {
                self.advance();
                self.expect(&TokenKind::LBracket)?;
                let key = self.parse_type()?;
                self.expect(&TokenKind::RBracket)?;
                let value = self.parse_type()?;
                TypeExprKind::Map(Box::new(key), Box::new(value))
            }
            TokenKind::Chan => {
                self.advance();
                self.match_token(&TokenKind::Arrow);
                TypeExprKind::Chan(Box::new(self.parse_type()?))
            }
            TokenKind::Interface => {
                self.advance();
                self.expect(&TokenKind::LBrace)?;
                self.skip_newlines();
                self.expect(&TokenKind::RBrace)?;
                TypeExprKind::Interface
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.match_token(&TokenKind::Dot) {
                    let sel = self.expect_ident()?;
                    TypeExprKind::Qualified { pkg: name, name: sel }
                } else {
                    TypeExprKind::Name(name)
                }
            }
            _ => {
                return Err(ParseError::expected(
                    "type",
                    self.current_kind(),
                    self.current().span,
                ));
            }
        };
        let end = self.tokens[self.pos - 1].span.end;
        Ok(TypeExpr { kind, span: Span::new(start, end) })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        self.skip_newlines();

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            stmts.push(self.parse_stmt()?);
            self.skip_newlines();
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind() {
            TokenKind::Var => self.parse_var_stmt()?,
            TokenKind::If => self.parse_if_stmt()?,
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::Switch => self.parse_switch_stmt()?,
            TokenKind::Return => {
                self.advance();
                let mut values = Vec::new();
                if !self.check(&TokenKind::Newline)
                    && !self.check(&TokenKind::Semi)
                    && !self.check(&TokenKind::RBrace)
                {
                    values.push(self.parse_expr()?);
                    while self.match_token(&TokenKind::Comma) {
                        values.push(self.parse_expr()?);
                    }
                }
                self.expect_terminator()?;
                StmtKind::Return(values)
            }
            TokenKind::Defer => {
                self.advance();
                let call = self.parse_expr()?;
                self.expect_terminator()?;
                StmtKind::Defer(call)
            }
            TokenKind::Go => {
                self.advance();
                let call = self.parse_expr()?;
                self.expect_terminator()?;
                StmtKind::Go(call)
            }
            TokenKind::Break => {
                self.advance();
                let label = self.opt_label();
                self.expect_terminator()?;
                StmtKind::Break(label)
            }
            TokenKind::Continue => {
                self.advance();
                let label = self.opt_label();
                self.expect_terminator()?;
                StmtKind::Continue(label)
            }
            TokenKind::LBrace => {
                let body = self.parse_block_body()?;
                self.expect_terminator()?;
                StmtKind::Block(body)
            }
            _ => {
                let kind = self.parse_simple_stmt()?;
                self.expect_terminator()?;
                kind
            }
        };

        let end = self.tokens[self.pos - 1].span.end;
        Ok(Stmt { kind, span: Span::new(start, end) })
    }

    fn opt_label(&mut self) -> Option<String> {
        if let TokenKind::Ident(name) = self.current_kind().clone() {
            self.advance();
            Some(name)
        } else {
            None
        }
    }

    fn parse_var_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Var)?;
        let mut names = vec![self.expect_ident()?];
        while self.match_token(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        let ty = if self.at_type_start() {
            Some(self.parse_type()?)
        } else {
            None
        };
        let mut values = Vec::new();
        if self.match_token(&TokenKind::Eq) {
            values.push(self.parse_expr()?);
            while self.match_token(&TokenKind::Comma) {
                values.push(self.parse_expr()?);
            }
        }
        self.expect_terminator()?;
        Ok(StmtKind::Var { names, ty, values })
    }

    /// Parse an expression, assignment, or inc/dec statement. The
    /// terminator is left for the caller.
    fn parse_simple_stmt(&mut self) -> Result<StmtKind, ParseError> {
        let first = self.parse_expr()?;
        let mut targets = vec![first];
        while self.match_token(&TokenKind::Comma) {
            targets.push(self.parse_expr()?);
        }

        match self.current_kind() {
            TokenKind::Eq | TokenKind::ColonEq => {
                let define = matches!(self.current_kind(), TokenKind::ColonEq);
                self.advance();
                let mut values = vec![self.parse_expr()?];
                while self.match_token(&TokenKind::Comma) {
                    values.push(self.parse_expr()?);
                }
                Ok(StmtKind::Assign { targets, values, define })
            }
            TokenKind::PlusEq | TokenKind::MinusEq | TokenKind::StarEq
            | TokenKind::SlashEq | TokenKind::PercentEq | TokenKind::AmpEq
            | TokenKind::PipeEq | TokenKind::CaretEq | TokenKind::LtLtEq
            | TokenKind::GtGtEq | TokenKind::AmpCaretEq => {
                self.advance();
                let value = self.parse_expr()?;
                Ok(StmtKind::Assign { targets, values: vec![value], define: false })
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let inc = matches!(self.current_kind(), TokenKind::PlusPlus);
                self.advance();
                let target = targets.into_iter().next().unwrap();
                Ok(StmtKind::IncDec { target, inc })
            }
            _ => {
                if targets.len() > 1 {
                    return Err(ParseError::expected(
                        "'=' or ':='",
                        self.current_kind(),
                        self.current().span,
                    ));
                }
                Ok(StmtKind::Expr(targets.into_iter().next().unwrap()))
            }
        }
    }

    fn parse_if_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::If)?;

        let saved = self.allow_composite;
        self.allow_composite = false;
        // An optional init statement (`if x := f(); cond`) is consumed
        // and dropped; the walker never inspects it.
        let mut cond = self.parse_init_or_cond()?;
        if self.match_token(&TokenKind::Semi) {
            cond = Some(self.parse_expr()?);
        }
        self.allow_composite = saved;

        let cond = cond.ok_or_else(|| {
            ParseError::expected("condition", self.current_kind(), self.current().span)
        })?;

        let then_body = self.parse_block_body()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                let start = self.current().span.start;
                let kind = self.parse_if_stmt()?;
                let end = self.tokens[self.pos - 1].span.end;
                Some(ElseBranch::If(Box::new(Stmt { kind, span: Span::new(start, end) })))
            } else {
                let body = self.parse_block_body()?;
                self.expect_terminator()?;
                Some(ElseBranch::Block(body))
            }
        } else {
            self.expect_terminator()?;
            None
        };

        Ok(StmtKind::If { cond, then_body, else_branch })
    }

    /// Parse either the condition expression of an if/switch header, or an
    /// init statement that will be followed by `;`. Returns the expression
    /// when one terminated the header, None when an init statement was
    /// consumed and the `;` is still current.
    fn parse_init_or_cond(&mut self) -> Result<Option<Expr>, ParseError> {
        let expr = self.parse_expr()?;
        match self.current_kind() {
            TokenKind::Comma | TokenKind::ColonEq | TokenKind::Eq => {
                while self.match_token(&TokenKind::Comma) {
                    self.parse_expr()?;
                }
                if !self.match_token(&TokenKind::ColonEq) {
                    self.expect(&TokenKind::Eq)?;
                }
                self.parse_expr()?;
                while self.match_token(&TokenKind::Comma) {
                    self.parse_expr()?;
                }
                Ok(None)
            }
            _ => Ok(Some(expr)),
        }
    }

    fn parse_for_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::For)?;

        let saved = self.allow_composite;
        self.allow_composite = false;
        let kind = self.parse_for_header();
        self.allow_composite = saved;
        let kind = kind?;

        Ok(kind)
    }

    fn parse_for_header(&mut self) -> Result<StmtKind, ParseError> {
        // `for { ... }`
        if self.check(&TokenKind::LBrace) {
            let body = self.parse_loop_body()?;
            return Ok(StmtKind::For { init: None, cond: None, post: None, body });
        }

        // `for range x { ... }`
        if self.match_token(&TokenKind::Range) {
            let expr = self.parse_expr()?;
            let body = self.parse_loop_body()?;
            return Ok(StmtKind::Range { key: None, value: None, define: false, expr, body });
        }

        let start = self.current().span.start;
        let first = self.parse_simple_or_range()?;

        match first {
            ForClause::Range(kind) => {
                if let StmtKind::Range { key, value, define, expr, .. } = kind {
                    let body = self.parse_loop_body()?;
                    Ok(StmtKind::Range { key, value, define, expr, body })
                } else {
                    unreachable!("parse_simple_or_range returned non-range in Range clause")
                }
            }
            ForClause::Simple(kind) => {
                if self.match_token(&TokenKind::Semi) {
                    // Three-clause form
                    let init_span = Span::new(start, self.tokens[self.pos - 1].span.end);
                    let init = Some(Box::new(Stmt { kind, span: init_span }));
                    let cond = if self.check(&TokenKind::Semi) {
                        None
                    } else {
                        Some(self.parse_expr()?)
                    };
                    self.expect(&TokenKind::Semi)?;
                    let post = if self.check(&TokenKind::LBrace) {
                        None
                    } else {
                        let post_start = self.current().span.start;
                        let post_kind = self.parse_simple_stmt()?;
                        let post_span = Span::new(post_start, self.tokens[self.pos - 1].span.end);
                        Some(Box::new(Stmt { kind: post_kind, span: post_span }))
                    };
                    let body = self.parse_loop_body()?;
                    Ok(StmtKind::For { init, cond, post, body })
                } else if let StmtKind::Expr(cond) = kind {
                    // `for cond { ... }`
                    let body = self.parse_loop_body()?;
                    Ok(StmtKind::For { init: None, cond: Some(cond), post: None, body })
                } else {
                    Err(ParseError::expected(
                        "';' or '{'",
                        self.current_kind(),
                        self.current().span,
                    ))
                }
            }
        }
    }

    fn parse_loop_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let body = self.parse_block_body()?;
        self.expect_terminator()?;
        Ok(body)
    }

    /// Parse a simple statement in a `for` header, detecting the range form
    /// (`k, v := range x`).
    fn parse_simple_or_range(&mut self) -> Result<ForClause, ParseError> {
        let first = self.parse_expr()?;
        let mut targets = vec![first];
        while self.match_token(&TokenKind::Comma) {
            targets.push(self.parse_expr()?);
        }

        match self.current_kind() {
            TokenKind::Eq | TokenKind::ColonEq => {
                let define = matches!(self.current_kind(), TokenKind::ColonEq);
                self.advance();
                if self.match_token(&TokenKind::Range) {
                    let expr = self.parse_expr()?;
                    let mut idents = targets.iter().map(ident_name);
                    let key = idents.next().flatten();
                    let value = idents.next().flatten();
                    return Ok(ForClause::Range(StmtKind::Range {
                        key,
                        value,
                        define,
                        expr,
                        body: Vec::new(),
                    }));
                }
                let mut values = vec![self.parse_expr()?];
                while self.match_token(&TokenKind::Comma) {
                    values.push(self.parse_expr()?);
                }
                Ok(ForClause::Simple(StmtKind::Assign { targets, values, define }))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let inc = matches!(self.current_kind(), TokenKind::PlusPlus);
                self.advance();
                let target = targets.into_iter().next().unwrap();
                Ok(ForClause::Simple(StmtKind::IncDec { target, inc }))
            }
            _ => {
                if targets.len() > 1 {
                    return Err(ParseError::expected(
                        "'=' or ':='",
                        self.current_kind(),
                        self.current().span,
                    ));
                }
                Ok(ForClause::Simple(StmtKind::Expr(targets.into_iter().next().unwrap())))
            }
        }
    }

    fn parse_switch_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Switch)?;

        let saved = self.allow_composite;
        self.allow_composite = false;
        let header: Result<Option<Expr>, ParseError> = (|| {
            if self.check(&TokenKind::LBrace) {
                return Ok(None);
            }
            let mut tag = self.parse_init_or_cond()?;
            if self.match_token(&TokenKind::Semi) {
                tag = if self.check(&TokenKind::LBrace) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
            }
            Ok(tag)
        })();
        self.allow_composite = saved;

        self.parse_switch_body(header?)
    }

    fn parse_switch_body(&mut self, tag: Option<Expr>) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        self.skip_newlines();

        let mut cases = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let exprs = if self.match_token(&TokenKind::Case) {
                let mut exprs = vec![self.parse_expr()?];
                while self.match_token(&TokenKind::Comma) {
                    exprs.push(self.parse_expr()?);
                }
                exprs
            } else {
                self.expect(&TokenKind::Default)?;
                Vec::new()
            };
            self.expect(&TokenKind::Colon)?;
            self.skip_newlines();

            let mut body = Vec::new();
            while !self.check(&TokenKind::Case)
                && !self.check(&TokenKind::Default)
                && !self.check(&TokenKind::RBrace)
                && !self.at_end()
            {
                if self.match_token(&TokenKind::Fallthrough) {
                    self.expect_terminator()?;
                    continue;
                }
                body.push(self.parse_stmt()?);
                self.skip_newlines();
            }
            cases.push(SwitchCase { exprs, body });
        }
        self.expect(&TokenKind::RBrace)?;
        self.expect_terminator()?;

        Ok(StmtKind::Switch { tag, cases })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;

        loop {
            let Some((op, l_bp, r_bp)) = binary_op(self.current_kind()) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            self.advance();
            // Conditions may continue on the next line after the operator
            self.skip_newlines();
            let rhs = self.parse_expr_bp(r_bp)?;
            let span = Span::new(lhs.span.start, rhs.span.end);
            lhs = Expr {
                kind: ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(rhs) },
                span,
            };
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let op = match self.current_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Caret => Some(UnaryOp::BitNot),
            TokenKind::Amp => Some(UnaryOp::Ref),
            TokenKind::Star => Some(UnaryOp::Deref),
            TokenKind::Arrow => Some(UnaryOp::Recv),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let span = Span::new(start, operand.span.end);
            return Ok(Expr {
                kind: ExprKind::Unary { op, operand: Box::new(operand) },
                span,
            });
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.current().span;
        let kind = match self.current_kind().clone() {
            TokenKind::Int(v) => {
                self.advance();
                ExprKind::Int(v)
            }
            TokenKind::Float(v) => {
                self.advance();
                ExprKind::Float(v)
            }
            TokenKind::String(s) => {
                self.advance();
                ExprKind::String(s)
            }
            TokenKind::Rune(c) => {
                self.advance();
                ExprKind::Rune(c)
            }
            TokenKind::Bool(b) => {
                self.advance();
                ExprKind::Bool(b)
            }
            TokenKind::Nil => {
                self.advance();
                ExprKind::Nil
            }
            TokenKind::Ident(name) => {
                self.advance();
                ExprKind::Ident(name)
            }
            TokenKind::LParen => {
                self.advance();
                self.skip_newlines();
                let saved = self.allow_composite;
                self.allow_composite = true;
                let inner = self.parse_expr();
                self.allow_composite = saved;
                let inner = inner?;
                self.skip_newlines();
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBracket | TokenKind::Map => {
                // Composite literal with a slice/array/map type
                let ty = self.parse_type()?;
                return self.parse_composite_body(ty);
            }
            _ => {
                return Err(ParseError::expected(
                    "expression",
                    self.current_kind(),
                    self.current().span,
                ));
            }
        };
        Ok(Expr { kind, span })
    }

    fn parse_postfix(&mut self, mut lhs: Expr) -> Result<Expr, ParseError> {
        loop {
            match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let field = self.expect_ident()?;
                    let span = Span::new(lhs.span.start, self.tokens[self.pos - 1].span.end);
                    lhs = Expr {
                        kind: ExprKind::Selector { object: Box::new(lhs), field },
                        span,
                    };
                }
                TokenKind::LParen => {
                    self.advance();
                    self.skip_newlines();
                    let saved = self.allow_composite;
                    self.allow_composite = true;
                    let args = self.parse_call_args();
                    self.allow_composite = saved;
                    let args = args?;
                    let span = Span::new(lhs.span.start, self.tokens[self.pos - 1].span.end);
                    lhs = Expr {
                        kind: ExprKind::Call { func: Box::new(lhs), args },
                        span,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    lhs = self.parse_index_or_slice(lhs)?;
                }
                TokenKind::LBrace if self.allow_composite && is_type_expr(&lhs) => {
                    let ty = type_from_expr(&lhs);
                    lhs = self.parse_composite_body(ty)?;
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.match_token(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            self.skip_newlines();
            args.push(self.parse_expr()?);
            self.match_token(&TokenKind::Ellipsis);
            self.skip_newlines();
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
            if self.check(&TokenKind::RParen) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    /// Parse `x[...` into an index or slice expression; `[` is consumed.
    fn parse_index_or_slice(&mut self, object: Expr) -> Result<Expr, ParseError> {
        let start = object.span.start;

        if self.match_token(&TokenKind::Colon) {
            // `x[:hi]` or `x[:]`
            let high = if self.check(&TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            };
            self.expect(&TokenKind::RBracket)?;
            let span = Span::new(start, self.tokens[self.pos - 1].span.end);
            return Ok(Expr {
                kind: ExprKind::Slice { object: Box::new(object), low: None, high },
                span,
            });
        }

        let first = self.parse_expr()?;
        if self.match_token(&TokenKind::Colon) {
            let high = if self.check(&TokenKind::RBracket) || self.check(&TokenKind::Colon) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            };
            // Capacity of a full slice expression is parsed and dropped
            if self.match_token(&TokenKind::Colon) {
                self.parse_expr()?;
            }
            self.expect(&TokenKind::RBracket)?;
            let span = Span::new(start, self.tokens[self.pos - 1].span.end);
            Ok(Expr {
                kind: ExprKind::Slice {
                    object: Box::new(object),
                    low: Some(Box::new(first)),
                    high,
                },
                span,
            })
        } else {
            self.expect(&TokenKind::RBracket)?;
            let span = Span::new(start, self.tokens[self.pos - 1].span.end);
            Ok(Expr {
                kind: ExprKind::Index { object: Box::new(object), index: Box::new(first) },
                span,
            })
        }
    }

    /// Parse a composite literal body; the type is already known and the
    /// current token is `{`. Keyed elements keep only their values.
    fn parse_composite_body(&mut self, ty: TypeExpr) -> Result<Expr, ParseError> {
        let start = ty.span.start;
        self.expect(&TokenKind::LBrace)?;
        self.skip_newlines();

        let mut elts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let saved = self.allow_composite;
            self.allow_composite = true;
            let elt = self.parse_expr();
            self.allow_composite = saved;
            let mut elt = elt?;
            if self.match_token(&TokenKind::Colon) {
                elt = self.parse_expr()?;
            }
            elts.push(elt);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.skip_newlines();
        self.expect(&TokenKind::RBrace)?;

        let span = Span::new(start, self.tokens[self.pos - 1].span.end);
        Ok(Expr { kind: ExprKind::Composite { ty, elts }, span })
    }
}

/// Outcome of parsing the first clause of a `for` header.
enum ForClause {
    Simple(StmtKind),
    Range(StmtKind),
}

/// The name of a plain identifier expression, for range bindings.
fn ident_name(expr: &Expr) -> Option<String> {
    match &expr.kind {
        ExprKind::Ident(name) => Some(name.clone()),
        _ => None,
    }
}

/// True if an already-parsed expression can serve as a composite literal
/// type: a plain name or a package-qualified name.
fn is_type_expr(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(_) => true,
        ExprKind::Selector { object, .. } => matches!(object.kind, ExprKind::Ident(_)),
        _ => false,
    }
}

fn type_from_expr(expr: &Expr) -> TypeExpr {
    match &expr.kind {
        ExprKind::Ident(name) => TypeExpr {
            kind: TypeExprKind::Name(name.clone()),
            span: expr.span,
        },
        ExprKind::Selector { object, field } => {
            let pkg = match &object.kind {
                ExprKind::Ident(name) => name.clone(),
                _ => unreachable!("checked by is_type_expr"),
            };
            TypeExpr {
                kind: TypeExprKind::Qualified { pkg, name: field.clone() },
                span: expr.span,
            }
        }
        _ => unreachable!("checked by is_type_expr"),
    }
}

/// Binding powers for binary operators, Go precedence levels 1-5.
fn binary_op(kind: &TokenKind) -> Option<(BinOp, u8, u8)> {
    let (op, level) = match kind {
        TokenKind::PipePipe => (BinOp::Or, 1),
        TokenKind::AmpAmp => (BinOp::And, 2),
        TokenKind::EqEq => (BinOp::Eq, 3),
        TokenKind::BangEq => (BinOp::Ne, 3),
        TokenKind::Lt => (BinOp::Lt, 3),
        TokenKind::Gt => (BinOp::Gt, 3),
        TokenKind::LtEq => (BinOp::Le, 3),
        TokenKind::GtEq => (BinOp::Ge, 3),
        TokenKind::Plus => (BinOp::Add, 4),
        TokenKind::Minus => (BinOp::Sub, 4),
        TokenKind::Pipe => (BinOp::BitOr, 4),
        TokenKind::Caret => (BinOp::BitXor, 4),
        TokenKind::Star => (BinOp::Mul, 5),
        TokenKind::Slash => (BinOp::Div, 5),
        TokenKind::Percent => (BinOp::Rem, 5),
        TokenKind::LtLt => (BinOp::Shl, 5),
        TokenKind::GtGt => (BinOp::Shr, 5),
        TokenKind::Amp => (BinOp::BitAnd, 5),
        TokenKind::AmpCaret => (BinOp::AndNot, 5),
        _ => return None,
    };
    Some((op, level * 2, level * 2 + 1))
}

/// Result of parsing: declarations plus any errors found.
#[derive(Debug)]
pub struct ParseResult {
    pub package: Option<String>,
    pub decls: Vec<Decl>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A parser error with location and friendly message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

impl ParseError {
    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        Self {
            span,
            message: format!("expected {}, found {}", expected, found.display_name()),
        }
    }
}
