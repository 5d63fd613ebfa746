//! Formula tokens

use std::fmt;

/// Token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Decimal literal such as `42` or `3.14`
    Number,
    /// Letters followed by digits, such as `AB12`
    CellReference,
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

impl TokenType {
    /// Token type of a single-character operator or parenthesis
    pub fn from_symbol(c: char) -> Option<TokenType> {
        match c {
            '+' => Some(TokenType::Plus),
            '-' => Some(TokenType::Minus),
            '*' => Some(TokenType::Star),
            '/' => Some(TokenType::Slash),
            '(' => Some(TokenType::LeftParen),
            ')' => Some(TokenType::RightParen),
            _ => None,
        }
    }
}

/// A lexical unit of formula text
///
/// `text` is the exact source substring and `position` its byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenType,
    pub text: String,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenType, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
