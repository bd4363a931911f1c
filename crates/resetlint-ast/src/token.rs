//! Token definitions for the lexer.

use crate::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    String(String),
    Rune(char),
    Bool(bool),

    // Identifier
    Ident(String),

    // Keywords
    Package,
    Import,
    Func,
    Type,
    Struct,
    Interface,
    Map,
    Chan,
    Const,
    Var,
    If,
    Else,
    For,
    Range,
    Switch,
    Case,
    Default,
    Fallthrough,
    Return,
    Break,
    Continue,
    Goto,
    Defer,
    Go,
    Select,
    Nil,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    AmpCaret,     // &^
    LtLt,         // <<
    GtGt,         // >>
    Eq,           // =
    ColonEq,      // :=
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Bang,
    Arrow,        // <-
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LtLtEq,
    GtGtEq,
    AmpCaretEq,   // &^=
    Ellipsis,     // ...
    Dot,

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semi,
    Comma,

    // Special
    Newline,
    Eof,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            // Literals
            TokenKind::Int(_) => "a number",
            TokenKind::Float(_) => "a number",
            TokenKind::String(_) => "a string",
            TokenKind::Rune(_) => "a rune",
            TokenKind::Bool(_) => "'true' or 'false'",

            // Identifier
            TokenKind::Ident(_) => "a name",

            // Keywords
            TokenKind::Package => "'package'",
            TokenKind::Import => "'import'",
            TokenKind::Func => "'func'",
            TokenKind::Type => "'type'",
            TokenKind::Struct => "'struct'",
            TokenKind::Interface => "'interface'",
            TokenKind::Map => "'map'",
            TokenKind::Chan => "'chan'",
            TokenKind::Const => "'const'",
            TokenKind::Var => "'var'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::For => "'for'",
            TokenKind::Range => "'range'",
            TokenKind::Switch => "'switch'",
            TokenKind::Case => "'case'",
            TokenKind::Default => "'default'",
            TokenKind::Fallthrough => "'fallthrough'",
            TokenKind::Return => "'return'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Goto => "'goto'",
            TokenKind::Defer => "'defer'",
            TokenKind::Go => "'go'",
            TokenKind::Select => "'select'",
            TokenKind::Nil => "'nil'",

            // Operators
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::AmpCaret => "'&^'",
            TokenKind::LtLt => "'<<'",
            TokenKind::GtGt => "'>>'",
            TokenKind::Eq => "'='",
            TokenKind::ColonEq => "':='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Arrow => "'<-'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::AmpEq => "'&='",
            TokenKind::PipeEq => "'|='",
            TokenKind::CaretEq => "'^='",
            TokenKind::LtLtEq => "'<<='",
            TokenKind::GtGtEq => "'>>='",
            TokenKind::AmpCaretEq => "'&^='",
            TokenKind::Ellipsis => "'...'",
            TokenKind::Dot => "'.'",

            // Delimiters
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semi => "';'",
            TokenKind::Comma => "','",

            // Special
            TokenKind::Newline => "end of line",
            TokenKind::Eof => "end of file",
        }
    }
}
