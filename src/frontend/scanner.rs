//! Scanner for MiniBasic
//!
//! Converts source text into tokens on demand. The parser pulls one
//! token at a time; the cursor only ever moves forward.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// The scanner state
pub struct Scanner {
    /// Source code as characters
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
}

impl Scanner {
    /// Create a new scanner for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Get the next character without advancing
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Create a span from start to current position
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    /// Create a token from the consumed text
    fn make_token(&self, kind: TokenKind) -> Token {
        let text: String = self.source[self.start..self.pos].iter().collect();
        Token::new(kind, text, self.make_span())
    }

    /// Skip spaces, tabs and carriage returns; newlines are tokens
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => self.advance(),
                _ => break,
            }
        }
    }

    /// Read a number literal: a maximal run of digits and decimal
    /// points, with an optional leading minus sign
    fn read_number(&mut self) -> Result<Token> {
        if self.peek() == Some('-') {
            self.advance();
        }
        loop {
            match self.peek() {
                None => {
                    return Err(Error::TruncatedLiteral {
                        what: "number",
                        span: self.make_span(),
                    });
                }
                Some(c) if c.is_ascii_digit() || c == '.' => self.advance(),
                Some(_) => break,
            }
        }
        Ok(self.make_token(TokenKind::Number))
    }

    /// Read an identifier or keyword: a maximal run of letters
    fn read_identifier(&mut self) -> Result<Token> {
        loop {
            match self.peek() {
                None => {
                    return Err(Error::TruncatedLiteral {
                        what: "identifier",
                        span: self.make_span(),
                    });
                }
                Some(c) if c.is_alphabetic() => self.advance(),
                Some(_) => break,
            }
        }
        let text: String = self.source[self.start..self.pos].iter().collect();
        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Ident);
        Ok(Token::new(kind, text, self.make_span()))
    }

    /// Read a string literal: verbatim text up to the closing quote,
    /// no escape processing
    fn read_string(&mut self) -> Result<Token> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(Error::UnterminatedString {
                        span: self.make_span(),
                    });
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token::new(TokenKind::StringLit, value, self.make_span()))
    }

    /// Get the next token; keeps returning Eof once the input is
    /// exhausted
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        self.start = self.pos;

        let Some(c) = self.peek() else {
            return Ok(Token::eof(self.make_span()));
        };

        if c.is_ascii_digit() {
            return self.read_number();
        }
        // A minus immediately followed by a digit is folded into the
        // number literal, not emitted as an operator
        if c == '-' && self.peek_next().is_some_and(|n| n.is_ascii_digit()) {
            return self.read_number();
        }
        if c.is_alphabetic() {
            return self.read_identifier();
        }
        if c == '"' {
            return self.read_string();
        }

        self.advance();
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            ',' => TokenKind::Comma,
            '\n' => TokenKind::Newline,
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    return Err(Error::UnrecognizedToken {
                        found: c,
                        span: self.make_span(),
                    });
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            other => {
                return Err(Error::UnrecognizedToken {
                    found: other,
                    span: self.make_span(),
                });
            }
        };
        Ok(self.make_token(kind))
    }

    /// Tokenize the remaining source through end of input
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}
