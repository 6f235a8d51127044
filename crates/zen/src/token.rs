//! Token kinds produced by the lexer and consumed by the evaluator/executor.

use std::fmt;

/// A single lexical unit.
///
/// `lexeme` retains the original source text for identifiers, string
/// contents (already unescaped), and number text; it is unused for pure
/// punctuation kinds where `kind` alone is enough to dispatch on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.kind, self.lexeme)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Number,
    String,
    Ident,
    True,
    False,
    Null,
    Undefined,

    // Keywords
    Let,
    Const,
    Var,
    Func,
    Return,
    If,
    Elif,
    Else,
    While,
    Break,
    Continue,
    Print,
    Import,
    Input,
    Range,
    Length,
    Keys,
    Values,
    Read,
    Write,
    Delete,
    Mkdir,
    Exists,
    Hash,
    Encrypt,
    Decrypt,
    Salt,
    Window,
    Start,
    Stop,
    Server,
    Clear,
    Rect,
    Circle,
    Render,

    /// Recognized for forward lexer compatibility; no statement executor
    /// support (see SPEC_FULL.md Non-goals).
    Class,
    New,
    This,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    Eq,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Bang,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Arrow,

    Eof,
}

/// Fixed keyword table consulted once an identifier has been scanned.
pub fn keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "undefined" => TokenKind::Undefined,
        "let" => TokenKind::Let,
        "const" => TokenKind::Const,
        "var" => TokenKind::Var,
        "func" => TokenKind::Func,
        "return" => TokenKind::Return,
        "if" => TokenKind::If,
        "elif" => TokenKind::Elif,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "print" => TokenKind::Print,
        "import" => TokenKind::Import,
        "input" => TokenKind::Input,
        "range" => TokenKind::Range,
        "length" => TokenKind::Length,
        "keys" => TokenKind::Keys,
        "values" => TokenKind::Values,
        "read" => TokenKind::Read,
        "write" => TokenKind::Write,
        "delete" => TokenKind::Delete,
        "mkdir" => TokenKind::Mkdir,
        "exists" => TokenKind::Exists,
        "hash" => TokenKind::Hash,
        "encrypt" => TokenKind::Encrypt,
        "decrypt" => TokenKind::Decrypt,
        "salt" => TokenKind::Salt,
        "window" => TokenKind::Window,
        "start" => TokenKind::Start,
        "stop" => TokenKind::Stop,
        "server" => TokenKind::Server,
        "clear" => TokenKind::Clear,
        "rect" => TokenKind::Rect,
        "circle" => TokenKind::Circle,
        "render" => TokenKind::Render,
        "class" => TokenKind::Class,
        "new" => TokenKind::New,
        "this" => TokenKind::This,
        _ => return None,
    })
}
