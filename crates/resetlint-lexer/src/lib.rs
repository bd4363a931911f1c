//! Lexer for the analyzed Go subset.

mod lexer;

pub use lexer::{LexError, LexResult, Lexer};
