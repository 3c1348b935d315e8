//! # SQL Lexer - Zero-Copy Tokenizer
//!
//! Single-pass scanner turning SQL source text into a stream of [`Token`]s.
//! All token values are borrowed slices pointing directly into the input
//! string; the lexer allocates nothing.
//!
//! ## Recognized Input
//!
//! - **Keywords**: matched case-insensitively against a compile-time perfect
//!   hash map (phf); the token value keeps the original spelling
//! - **Identifiers**: `[A-Za-z_][A-Za-z0-9_]*`, case preserved
//! - **Numbers**: decimal integers, decimals (`1.`, `3.14`), scientific
//!   notation (`1e3`, `2.5E-4`), and hex (`0xFF`); the raw spelling is kept,
//!   decoding to `f64` happens in the parser
//! - **Strings**: single-quoted, `''` escapes an embedded quote; the value
//!   excludes the delimiters
//! - **Blobs**: `x'4142'` / `X'4142'` with a hex body
//! - **Operators**: greedy longest match, so `<<`, `>=`, `==`, `<>`, `||`
//!   are single tokens
//! - **Comments**: `-- ...` to end of line and `/* ... */`, skipped
//!
//! Unrecognized or malformed input yields a token of kind
//! [`TokenKind::Invalid`]; the lexer itself never fails and keeps scanning.
//! Once the input is exhausted every further call yields `Eof`.
//!
//! ## Position Tracking
//!
//! Lines and columns are 1-based. A newline resets the column and bumps the
//! line; every other byte (tabs included) advances the column by one. Each
//! token records the position of its first byte.

use crate::token::{Token, TokenKind};
use phf::phf_map;

static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "ALL" => TokenKind::All,
    "AND" => TokenKind::And,
    "AS" => TokenKind::As,
    "ASC" => TokenKind::Asc,
    "BETWEEN" => TokenKind::Between,
    "BY" => TokenKind::By,
    "CASE" => TokenKind::Case,
    "CAST" => TokenKind::Cast,
    "COLLATE" => TokenKind::Collate,
    "CREATE" => TokenKind::Create,
    "DELETE" => TokenKind::Delete,
    "DESC" => TokenKind::Desc,
    "DISTINCT" => TokenKind::Distinct,
    "DROP" => TokenKind::Drop,
    "ELSE" => TokenKind::Else,
    "END" => TokenKind::End,
    "ESCAPE" => TokenKind::Escape,
    "EXISTS" => TokenKind::Exists,
    "FIRST" => TokenKind::First,
    "FROM" => TokenKind::From,
    "GLOB" => TokenKind::Glob,
    "GROUP" => TokenKind::Group,
    "HAVING" => TokenKind::Having,
    "IF" => TokenKind::If,
    "IN" => TokenKind::In,
    "IS" => TokenKind::Is,
    "LAST" => TokenKind::Last,
    "LIKE" => TokenKind::Like,
    "LIMIT" => TokenKind::Limit,
    "MATCH" => TokenKind::Match,
    "NOT" => TokenKind::Not,
    "NULL" => TokenKind::Null,
    "NULLS" => TokenKind::Nulls,
    "OFFSET" => TokenKind::Offset,
    "OR" => TokenKind::Or,
    "ORDER" => TokenKind::Order,
    "RECURSIVE" => TokenKind::Recursive,
    "REGEXP" => TokenKind::Regexp,
    "RETURNING" => TokenKind::Returning,
    "SELECT" => TokenKind::Select,
    "TABLE" => TokenKind::Table,
    "TEMP" => TokenKind::Temp,
    "TEMPORARY" => TokenKind::Temporary,
    "THEN" => TokenKind::Then,
    "WHEN" => TokenKind::When,
    "WHERE" => TokenKind::Where,
    "WITH" => TokenKind::With,
};

pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    token_line: u32,
    token_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            token_line: 1,
            token_column: 1,
        }
    }

    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_whitespace();
        self.token_line = self.line;
        self.token_column = self.column;

        if self.is_eof() {
            return self.token(TokenKind::Eof, "");
        }

        let ch = self.current();

        if ch.is_ascii_alphabetic() || ch == b'_' {
            return self.scan_identifier_or_keyword();
        }

        if ch.is_ascii_digit() {
            return self.scan_number();
        }

        match ch {
            b'\'' => self.scan_string(),
            b'-' => self.scan_minus(),
            b'/' => self.scan_slash(),
            b'(' => self.punct(TokenKind::ParenOpen),
            b')' => self.punct(TokenKind::ParenClose),
            b',' => self.punct(TokenKind::Comma),
            b';' => self.punct(TokenKind::Semicolon),
            b'.' => self.punct(TokenKind::Period),
            b'*' => self.punct(TokenKind::Asterisk),
            b'+' => self.punct(TokenKind::Plus),
            b'%' => self.punct(TokenKind::Percent),
            b'~' => self.punct(TokenKind::Tilde),
            b'&' => self.punct(TokenKind::Ampersand),
            b'|' => self.scan_pipe(),
            b'<' => self.scan_less_than(),
            b'>' => self.scan_greater_than(),
            b'=' => self.scan_equals(),
            b'!' => self.scan_exclamation(),
            _ => {
                let start = self.pos;
                self.advance();
                self.token(TokenKind::Invalid, &self.input[start..self.pos])
            }
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn current(&self) -> u8 {
        self.bytes[self.pos]
    }

    fn peek_char(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        if !self.is_eof() {
            if self.current() == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() {
            match self.current() {
                b' ' | b'\t' | b'\r' | b'\n' => self.advance(),
                _ => break,
            }
        }
    }

    fn token(&self, kind: TokenKind, value: &'a str) -> Token<'a> {
        Token::new(kind, value, self.token_line, self.token_column)
    }

    fn punct(&mut self, kind: TokenKind) -> Token<'a> {
        let start = self.pos;
        self.advance();
        self.token(kind, &self.input[start..self.pos])
    }

    fn scan_identifier_or_keyword(&mut self) -> Token<'a> {
        let start = self.pos;

        if (self.current() == b'x' || self.current() == b'X') && self.peek_char() == Some(b'\'') {
            return self.scan_blob_literal();
        }

        while !self.is_eof() && (self.current().is_ascii_alphanumeric() || self.current() == b'_') {
            self.advance();
        }

        let ident = &self.input[start..self.pos];
        let upper = ident.to_ascii_uppercase();

        if let Some(&kind) = KEYWORDS.get(upper.as_str()) {
            self.token(kind, ident)
        } else {
            self.token(TokenKind::Identifier, ident)
        }
    }

    fn scan_blob_literal(&mut self) -> Token<'a> {
        let lexeme_start = self.pos;
        self.advance();
        self.advance();

        let start = self.pos;

        while !self.is_eof() && self.current() != b'\'' {
            if !self.current().is_ascii_hexdigit() {
                self.advance();
                return self.token(TokenKind::Invalid, &self.input[lexeme_start..self.pos]);
            }
            self.advance();
        }

        if self.is_eof() {
            return self.token(TokenKind::Invalid, &self.input[lexeme_start..self.pos]);
        }

        let body = &self.input[start..self.pos];
        self.advance();

        self.token(TokenKind::BlobLiteral, body)
    }

    fn scan_number(&mut self) -> Token<'a> {
        let start = self.pos;

        if self.current() == b'0' && matches!(self.peek_char(), Some(b'x') | Some(b'X')) {
            self.advance();
            self.advance();
            let digits_start = self.pos;
            while !self.is_eof() && self.current().is_ascii_hexdigit() {
                self.advance();
            }
            let kind = if self.pos == digits_start {
                TokenKind::Invalid
            } else {
                TokenKind::NumericLiteral
            };
            return self.token(kind, &self.input[start..self.pos]);
        }

        while !self.is_eof() && self.current().is_ascii_digit() {
            self.advance();
        }

        if !self.is_eof() && self.current() == b'.' {
            self.advance();
            while !self.is_eof() && self.current().is_ascii_digit() {
                self.advance();
            }
        }

        if !self.is_eof() && (self.current() == b'e' || self.current() == b'E') {
            self.advance();
            if !self.is_eof() && (self.current() == b'+' || self.current() == b'-') {
                self.advance();
            }
            let exponent_start = self.pos;
            while !self.is_eof() && self.current().is_ascii_digit() {
                self.advance();
            }
            if self.pos == exponent_start {
                return self.token(TokenKind::Invalid, &self.input[start..self.pos]);
            }
        }

        self.token(TokenKind::NumericLiteral, &self.input[start..self.pos])
    }

    fn scan_string(&mut self) -> Token<'a> {
        let lexeme_start = self.pos;
        self.advance();
        let start = self.pos;

        loop {
            if self.is_eof() {
                return self.token(TokenKind::Invalid, &self.input[lexeme_start..self.pos]);
            }

            if self.current() == b'\'' {
                if self.peek_char() == Some(b'\'') {
                    self.advance();
                    self.advance();
                } else {
                    let end = self.pos;
                    self.advance();
                    return self.token(TokenKind::StringLiteral, &self.input[start..end]);
                }
            } else {
                self.advance();
            }
        }
    }

    fn scan_minus(&mut self) -> Token<'a> {
        let start = self.pos;
        self.advance();

        if !self.is_eof() && self.current() == b'-' {
            while !self.is_eof() && self.current() != b'\n' {
                self.advance();
            }
            return self.next_token();
        }

        self.token(TokenKind::Minus, &self.input[start..self.pos])
    }

    fn scan_slash(&mut self) -> Token<'a> {
        let start = self.pos;
        self.advance();

        if !self.is_eof() && self.current() == b'*' {
            self.advance();
            loop {
                if self.is_eof() {
                    return self.token(TokenKind::Invalid, &self.input[start..self.pos]);
                }
                if self.current() == b'*' && self.peek_char() == Some(b'/') {
                    self.advance();
                    self.advance();
                    return self.next_token();
                }
                self.advance();
            }
        }

        self.token(TokenKind::Slash, &self.input[start..self.pos])
    }

    fn scan_pipe(&mut self) -> Token<'a> {
        let start = self.pos;
        self.advance();

        if !self.is_eof() && self.current() == b'|' {
            self.advance();
            return self.token(TokenKind::DoublePipe, &self.input[start..self.pos]);
        }

        self.token(TokenKind::Pipe, &self.input[start..self.pos])
    }

    fn scan_less_than(&mut self) -> Token<'a> {
        let start = self.pos;
        self.advance();

        let kind = if !self.is_eof() {
            match self.current() {
                b'=' => {
                    self.advance();
                    TokenKind::LtEq
                }
                b'>' => {
                    self.advance();
                    TokenKind::NotEq2
                }
                b'<' => {
                    self.advance();
                    TokenKind::ShiftLeft
                }
                _ => TokenKind::Lt,
            }
        } else {
            TokenKind::Lt
        };

        self.token(kind, &self.input[start..self.pos])
    }

    fn scan_greater_than(&mut self) -> Token<'a> {
        let start = self.pos;
        self.advance();

        let kind = if !self.is_eof() {
            match self.current() {
                b'=' => {
                    self.advance();
                    TokenKind::GtEq
                }
                b'>' => {
                    self.advance();
                    TokenKind::ShiftRight
                }
                _ => TokenKind::Gt,
            }
        } else {
            TokenKind::Gt
        };

        self.token(kind, &self.input[start..self.pos])
    }

    fn scan_equals(&mut self) -> Token<'a> {
        let start = self.pos;
        self.advance();

        if !self.is_eof() && self.current() == b'=' {
            self.advance();
            return self.token(TokenKind::DoubleEq, &self.input[start..self.pos]);
        }

        self.token(TokenKind::Eq, &self.input[start..self.pos])
    }

    fn scan_exclamation(&mut self) -> Token<'a> {
        let start = self.pos;
        self.advance();

        if !self.is_eof() && self.current() == b'=' {
            self.advance();
            return self.token(TokenKind::NotEq1, &self.input[start..self.pos]);
        }

        self.token(TokenKind::Invalid, &self.input[start..self.pos])
    }
}
