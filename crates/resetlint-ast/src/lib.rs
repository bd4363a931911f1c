// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the analyzed Go subset.
//!
//! This crate defines the AST nodes shared between the lexer, parser,
//! and the reset-completeness analysis.

pub mod span;
pub mod token;
pub mod ty;
pub mod expr;
pub mod stmt;
pub mod decl;

pub use span::Span;
