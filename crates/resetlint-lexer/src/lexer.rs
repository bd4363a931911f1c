//! The lexer implementation using logos.

use logos::Logos;
use resetlint_ast::token::{Token, TokenKind};
use resetlint_ast::Span;
use thiserror::Error;

/// Raw token type for logos - we parse values in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip horizontal whitespace (not newlines)
enum RawToken {
    // === Keywords ===
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("func")]
    Func,
    #[token("type")]
    Type,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,
    #[token("map")]
    Map,
    #[token("chan")]
    Chan,
    #[token("const")]
    Const,
    #[token("var")]
    Var,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("range")]
    Range,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("fallthrough")]
    Fallthrough,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("goto")]
    Goto,
    #[token("defer")]
    Defer,
    #[token("go")]
    Go,
    #[token("select")]
    Select,
    #[token("nil")]
    Nil,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Operators (order matters - longer first) ===
    // Three-character operators
    #[token("<<=")]
    LtLtEq,
    #[token(">>=")]
    GtGtEq,
    #[token("&^=")]
    AmpCaretEq,
    #[token("...")]
    Ellipsis,

    // Two-character operators
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token(":=")]
    ColonEq,
    #[token("<-")]
    Arrow,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("&^")]
    AmpCaret,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,

    // Single-character operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token(".")]
    Dot,

    // === Delimiters ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,

    // === Newline (statement terminator, as in Go) ===
    #[token("\n")]
    Newline,

    // === Comments (skip them) ===
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    // Block comments do not nest in Go
    #[token("/*", block_comment)]
    BlockComment,

    // === Literals ===
    // Hex integers
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    HexInt,

    // Binary integers
    #[regex(r"0[bB][01_]+")]
    BinInt,

    // Octal integers (0o prefix and the legacy leading-zero form)
    #[regex(r"0[oO][0-7_]+")]
    OctInt,

    // Float literals (must come before decimal int to match properly)
    #[regex(r"[0-9][0-9_]*\.[0-9]*([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+")]
    Float,

    // Decimal integers
    #[regex(r"[0-9][0-9_]*")]
    DecInt,

    // Rune literal
    #[regex(r"'([^'\\]|\\.)'")]
    Rune,

    // Raw string (backquotes, no escapes, may span lines)
    #[regex(r"`[^`]*`")]
    RawString,

    // Interpreted string
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    // === Identifier (must come after keywords) ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Skip a block comment. Go block comments do not nest.
fn block_comment(lexer: &mut logos::Lexer<RawToken>) -> logos::Skip {
    let remainder = lexer.remainder();
    match remainder.find("*/") {
        Some(end) => lexer.bump(end + 2),
        None => lexer.bump(remainder.len()), // Unterminated - consume to EOF
    }
    logos::Skip
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The lexer for Go source code.
pub struct Lexer<'a> {
    source: &'a str,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self { source, errors: Vec::new() }
    }

    /// Tokenize the entire source, collecting multiple errors.
    pub fn tokenize(&mut self) -> LexResult {
        let mut tokens = Vec::new();
        let mut logos_lexer = RawToken::lexer(self.source);

        while let Some(result) = logos_lexer.next() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }

            let span = logos_lexer.span();
            let slice = logos_lexer.slice();

            let kind = match result {
                Ok(raw) => match self.convert_token(raw, slice, span.start, span.end) {
                    Ok(kind) => kind,
                    Err(e) => {
                        self.errors.push(e);
                        continue;
                    }
                },
                Err(()) => {
                    let ch = self.source[span.start..].chars().next().unwrap_or('?');
                    self.errors.push(LexError::unexpected_char(ch, span.start));
                    continue;
                }
            };

            tokens.push(Token {
                kind,
                span: Span::new(span.start, span.end),
            });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.source.len(), self.source.len()),
        });

        LexResult {
            tokens,
            errors: std::mem::take(&mut self.errors),
        }
    }

    /// Convert a raw logos token to our TokenKind, parsing literals.
    fn convert_token(&self, raw: RawToken, slice: &str, start: usize, end: usize) -> Result<TokenKind, LexError> {
        Ok(match raw {
            // Keywords
            RawToken::Package => TokenKind::Package,
            RawToken::Import => TokenKind::Import,
            RawToken::Func => TokenKind::Func,
            RawToken::Type => TokenKind::Type,
            RawToken::Struct => TokenKind::Struct,
            RawToken::Interface => TokenKind::Interface,
            RawToken::Map => TokenKind::Map,
            RawToken::Chan => TokenKind::Chan,
            RawToken::Const => TokenKind::Const,
            RawToken::Var => TokenKind::Var,
            RawToken::If => TokenKind::If,
            RawToken::Else => TokenKind::Else,
            RawToken::For => TokenKind::For,
            RawToken::Range => TokenKind::Range,
            RawToken::Switch => TokenKind::Switch,
            RawToken::Case => TokenKind::Case,
            RawToken::Default => TokenKind::Default,
            RawToken::Fallthrough => TokenKind::Fallthrough,
            RawToken::Return => TokenKind::Return,
            RawToken::Break => TokenKind::Break,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Goto => TokenKind::Goto,
            RawToken::Defer => TokenKind::Defer,
            RawToken::Go => TokenKind::Go,
            RawToken::Select => TokenKind::Select,
            RawToken::Nil => TokenKind::Nil,
            RawToken::True => TokenKind::Bool(true),
            RawToken::False => TokenKind::Bool(false),

            // Operators
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Caret => TokenKind::Caret,
            RawToken::AmpCaret => TokenKind::AmpCaret,
            RawToken::LtLt => TokenKind::LtLt,
            RawToken::GtGt => TokenKind::GtGt,
            RawToken::Eq => TokenKind::Eq,
            RawToken::ColonEq => TokenKind::ColonEq,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::BangEq => TokenKind::BangEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::PlusPlus => TokenKind::PlusPlus,
            RawToken::MinusMinus => TokenKind::MinusMinus,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::PercentEq => TokenKind::PercentEq,
            RawToken::AmpEq => TokenKind::AmpEq,
            RawToken::PipeEq => TokenKind::PipeEq,
            RawToken::CaretEq => TokenKind::CaretEq,
            RawToken::LtLtEq => TokenKind::LtLtEq,
            RawToken::GtGtEq => TokenKind::GtGtEq,
            RawToken::AmpCaretEq => TokenKind::AmpCaretEq,
            RawToken::Ellipsis => TokenKind::Ellipsis,
            RawToken::Dot => TokenKind::Dot,

            // Delimiters
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Comma => TokenKind::Comma,

            // Special
            RawToken::Newline => TokenKind::Newline,

            // Literals - parse the values
            RawToken::DecInt => {
                let cleaned: String = slice.chars().filter(|c| *c != '_').collect();
                let value = cleaned.parse::<i64>().map_err(|_| LexError::invalid_number(start, end))?;
                TokenKind::Int(value)
            }
            RawToken::HexInt => {
                let cleaned: String = slice[2..].chars().filter(|c| *c != '_').collect();
                let value = i64::from_str_radix(&cleaned, 16).map_err(|_| LexError::invalid_number(start, end))?;
                TokenKind::Int(value)
            }
            RawToken::BinInt => {
                let cleaned: String = slice[2..].chars().filter(|c| *c != '_').collect();
                let value = i64::from_str_radix(&cleaned, 2).map_err(|_| LexError::invalid_number(start, end))?;
                TokenKind::Int(value)
            }
            RawToken::OctInt => {
                let cleaned: String = slice[2..].chars().filter(|c| *c != '_').collect();
                let value = i64::from_str_radix(&cleaned, 8).map_err(|_| LexError::invalid_number(start, end))?;
                TokenKind::Int(value)
            }
            RawToken::Float => {
                let cleaned: String = slice.chars().filter(|c| *c != '_').collect();
                let value = cleaned.parse::<f64>().map_err(|_| LexError::invalid_number(start, end))?;
                TokenKind::Float(value)
            }
            RawToken::Rune => {
                let inner = &slice[1..slice.len() - 1]; // Remove quotes
                let ch = parse_rune(inner, start)?;
                TokenKind::Rune(ch)
            }
            RawToken::String => {
                let inner = &slice[1..slice.len() - 1]; // Remove quotes
                let s = parse_string(inner, start)?;
                TokenKind::String(s)
            }
            RawToken::RawString => {
                let inner = &slice[1..slice.len() - 1]; // Remove backquotes
                // Raw strings don't process escapes
                TokenKind::String(inner.to_string())
            }
            RawToken::Ident => TokenKind::Ident(slice.to_string()),

            // These are skipped by logos, but we list them for completeness
            RawToken::LineComment | RawToken::BlockComment => {
                unreachable!("comments are skipped")
            }
        })
    }
}

/// Parse a rune literal (handling escape sequences).
fn parse_rune(s: &str, pos: usize) -> Result<char, LexError> {
    let mut chars = s.chars();
    match chars.next() {
        Some('\\') => parse_escape(&mut chars, pos),
        Some(c) => Ok(c),
        None => Err(LexError::invalid_escape(pos)),
    }
}

/// Parse a string literal (handling escape sequences).
fn parse_string(s: &str, pos: usize) -> Result<String, LexError> {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            result.push(parse_escape(&mut chars, pos)?);
        } else {
            result.push(c);
        }
    }

    Ok(result)
}

/// Parse an escape sequence.
fn parse_escape(chars: &mut impl Iterator<Item = char>, pos: usize) -> Result<char, LexError> {
    match chars.next() {
        Some('n') => Ok('\n'),
        Some('r') => Ok('\r'),
        Some('t') => Ok('\t'),
        Some('\\') => Ok('\\'),
        Some('0') => Ok('\0'),
        Some('\'') => Ok('\''),
        Some('"') => Ok('"'),
        _ => Err(LexError::invalid_escape(pos)),
    }
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

impl LexError {
    fn unexpected_char(ch: char, pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + ch.len_utf8()),
            message: format!("unexpected character '{}'", ch),
        }
    }

    fn invalid_escape(pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + 1),
            message: "invalid escape sequence".to_string(),
        }
    }

    fn invalid_number(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "invalid number".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resetlint_ast::token::TokenKind;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let result = Lexer::new(src).tokenize();
        assert!(result.is_ok(), "lex errors: {:?}", result.errors);
        result
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !matches!(k, TokenKind::Newline))
            .collect()
    }

    #[test]
    fn lex_assignment() {
        let toks = kinds("p.a = 0");
        assert_eq!(
            toks,
            vec![
                TokenKind::Ident("p".into()),
                TokenKind::Dot,
                TokenKind::Ident("a".into()),
                TokenKind::Eq,
                TokenKind::Int(0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_define_and_range() {
        let toks = kinds("for k := range p.d {}");
        assert_eq!(
            toks,
            vec![
                TokenKind::For,
                TokenKind::Ident("k".into()),
                TokenKind::ColonEq,
                TokenKind::Range,
                TokenKind::Ident("p".into()),
                TokenKind::Dot,
                TokenKind::Ident("d".into()),
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_comments_skipped() {
        let toks = kinds("a // line\n/* block\nstill block */ b");
        assert_eq!(
            toks,
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_string_forms() {
        let toks = kinds(r#"x = "a\tb""#);
        assert!(toks.contains(&TokenKind::String("a\tb".into())));
        let toks = kinds("y = `raw \\n`");
        assert!(toks.contains(&TokenKind::String("raw \\n".into())));
    }

    #[test]
    fn lex_unexpected_char_is_error() {
        let result = Lexer::new("a $ b").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains('$'));
    }

    #[test]
    fn lex_number_bases() {
        let toks = kinds("0xff 0b101 0o17 12 1.5");
        assert_eq!(toks[0], TokenKind::Int(255));
        assert_eq!(toks[1], TokenKind::Int(5));
        assert_eq!(toks[2], TokenKind::Int(15));
        assert_eq!(toks[3], TokenKind::Int(12));
        assert_eq!(toks[4], TokenKind::Float(1.5));
    }
}
