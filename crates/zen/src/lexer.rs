//! Tokeniser. Total: it never fails, it only ever produces tokens.

use log::warn;

use crate::token::{Token, TokenKind, keyword};

/// Converts source text into a flat token sequence.
///
/// Unrecognised bytes are reported at `warn!` and skipped; this is the only
/// externally visible effect besides the returned tokens.
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<String>) {
        let line = self.line;
        self.tokens.push(Token::new(kind, lexeme, line));
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.advance();
                }
                b'#' => {
                    while let Some(c) = self.peek()
                        && c != b'\n'
                    {
                        self.advance();
                    }
                }
                b'"' | b'\'' | b'`' => self.lex_string(b),
                b'0'..=b'9' => self.lex_number(),
                b'_' | b'a'..=b'z' | b'A'..=b'Z' => self.lex_ident(),
                _ => self.lex_punct(),
            }
        }
        self.push(TokenKind::Eof, "");
        self.tokens
    }

    fn lex_string(&mut self, quote: u8) {
        let line = self.line;
        self.advance();
        let mut s = String::new();
        loop {
            match self.advance() {
                None => break,
                Some(b) if b == quote => break,
                Some(b'\\') => {
                    if let Some(escaped) = self.advance() {
                        s.push(escaped as char);
                    }
                }
                Some(b) => s.push(b as char),
            }
        }
        self.tokens.push(Token::new(TokenKind::String, s, line));
    }

    fn lex_number(&mut self) {
        let start = self.pos;
        let line = self.line;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.advance();
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mut lookahead = 1;
            if matches!(self.peek_at(lookahead), Some(b'+' | b'-')) {
                lookahead += 1;
            }
            if matches!(self.peek_at(lookahead), Some(b'0'..=b'9')) {
                self.advance();
                if matches!(self.peek(), Some(b'+' | b'-')) {
                    self.advance();
                }
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.advance();
                }
            }
        }
        let text = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
        self.tokens.push(Token::new(TokenKind::Number, text, line));
    }

    fn lex_ident(&mut self) {
        let start = self.pos;
        let line = self.line;
        while matches!(self.peek(), Some(b'_' | b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9')) {
            self.advance();
        }
        let mut text = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
        // "http-server" is the one hyphenated keyword the language recognises;
        // everywhere else a hyphen starts a new MINUS token.
        if text == "http" && self.peek() == Some(b'-') && self.bytes[self.pos + 1..].starts_with(b"server") {
            self.pos += 7;
            text = "http-server".to_string();
        }
        let kind = keyword(&text).unwrap_or(TokenKind::Ident);
        self.tokens.push(Token::new(kind, text, line));
    }

    fn lex_punct(&mut self) {
        let line = self.line;
        let three = self.bytes.get(self.pos..self.pos + 3);
        if let Some(b"===") = three {
            self.pos += 3;
            self.tokens.push(Token::new(TokenKind::EqEqEq, "===", line));
            return;
        }
        if let Some(b"!==") = three {
            self.pos += 3;
            self.tokens.push(Token::new(TokenKind::NotEqEq, "!==", line));
            return;
        }
        let two = self.bytes.get(self.pos..self.pos + 2);
        let two_kind = match two {
            Some(b"==") => Some(TokenKind::EqEq),
            Some(b"!=") => Some(TokenKind::NotEq),
            Some(b"<=") => Some(TokenKind::LtEq),
            Some(b">=") => Some(TokenKind::GtEq),
            Some(b"<<") => Some(TokenKind::Shl),
            Some(b">>") => Some(TokenKind::Shr),
            Some(b"&&") => Some(TokenKind::AmpAmp),
            Some(b"||") => Some(TokenKind::PipePipe),
            Some(b"**") => Some(TokenKind::StarStar),
            Some(b"++") => Some(TokenKind::PlusPlus),
            Some(b"--") => Some(TokenKind::MinusMinus),
            Some(b"+=") => Some(TokenKind::PlusEq),
            Some(b"-=") => Some(TokenKind::MinusEq),
            Some(b"*=") => Some(TokenKind::StarEq),
            Some(b"/=") => Some(TokenKind::SlashEq),
            Some(b"->") => Some(TokenKind::Arrow),
            _ => None,
        };
        if let Some(kind) = two_kind {
            let lexeme = std::str::from_utf8(two.unwrap()).unwrap().to_string();
            self.pos += 2;
            self.tokens.push(Token::new(kind, lexeme, line));
            return;
        }

        let b = self.advance().expect("checked by caller");
        let kind = match b {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'&' => TokenKind::Amp,
            b'|' => TokenKind::Pipe,
            b'^' => TokenKind::Caret,
            b'=' => TokenKind::Eq,
            b'!' => TokenKind::Bang,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            other => {
                warn!("zen::lexer: unrecognized byte {other:#04x} at line {line}, skipping");
                return;
            }
        };
        self.tokens.push(Token::new(kind, (b as char).to_string(), line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_numbers_and_operators() {
        assert_eq!(
            kinds("1 + 2.5e1"),
            vec![TokenKind::Number, TokenKind::Plus, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn tokenizes_string_with_escape() {
        let tokens = lex(r#""a\"b""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "a\"b");
    }

    #[test]
    fn greedy_multichar_operators() {
        assert_eq!(
            kinds("a === b !== c"),
            vec![
                TokenKind::Ident,
                TokenKind::EqEqEq,
                TokenKind::Ident,
                TokenKind::NotEqEq,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_are_recognized() {
        assert_eq!(kinds("let const func if elif else while return"), vec![
            TokenKind::Let,
            TokenKind::Const,
            TokenKind::Func,
            TokenKind::If,
            TokenKind::Elif,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Return,
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn http_server_hyphenated_keyword() {
        assert_eq!(kinds("start http-server"), vec![TokenKind::Start, TokenKind::Ident, TokenKind::Eof]);
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(kinds("1 # comment\n2"), vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn unrecognized_byte_is_skipped_not_fatal() {
        assert_eq!(kinds("1 @ 2"), vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]);
    }
}
