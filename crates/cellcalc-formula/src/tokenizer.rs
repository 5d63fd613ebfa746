//! Formula tokenizer
//!
//! A single left-to-right scan with no backtracking. Numbers and cell references are
//! read with maximal munch:
//!
//! - number: `digits ('.' digits)?`, the integer part is mandatory
//! - cell reference: `letters digits`, both parts mandatory
//! - operators `+ - * /` and parentheses are single characters
//!
//! Whitespace between tokens is skipped. Any other character is a syntax error.

use crate::error::{FormulaError, FormulaResult};
use crate::token::{Token, TokenType};

/// Split formula text into tokens
///
/// # Example
/// ```rust
/// use cellcalc_formula::{tokenize, TokenType};
///
/// let tokens = tokenize("AB12 * 3.14").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, [TokenType::CellReference, TokenType::Star, TokenType::Number]);
/// assert_eq!(tokens[2].text, "3.14");
/// ```
pub fn tokenize(text: &str) -> FormulaResult<Vec<Token>> {
    let mut tokenizer = Tokenizer::new(text);
    let mut tokens = Vec::new();

    loop {
        tokenizer.skip_whitespace();
        if tokenizer.is_at_end() {
            break;
        }
        tokens.push(tokenizer.read_token()?);
    }

    Ok(tokens)
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn read_token(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Err(FormulaError::syntax(start, "unexpected end of input")),
        };

        if let Some(kind) = TokenType::from_symbol(c) {
            self.advance();
            return Ok(Token::new(kind, &self.input[start..self.pos], start));
        }

        if c.is_ascii_digit() || c == '.' {
            return self.read_number();
        }

        if c.is_ascii_alphabetic() {
            return self.read_cell_reference();
        }

        Err(FormulaError::syntax(
            start,
            format!("unexpected character '{}'", c),
        ))
    }

    fn read_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        let integer_digits = self.skip_digits();
        if integer_digits == 0 {
            return Err(FormulaError::syntax(
                start,
                "number must start with a digit",
            ));
        }

        if self.peek_char() == Some('.') {
            let dot = self.pos;
            self.advance();
            if self.skip_digits() == 0 {
                return Err(FormulaError::syntax(
                    dot,
                    "expected digits after decimal point",
                ));
            }
        }

        Ok(Token::new(
            TokenType::Number,
            &self.input[start..self.pos],
            start,
        ))
    }

    fn read_cell_reference(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_alphabetic()) {
            self.advance();
        }

        if self.skip_digits() == 0 {
            return Err(FormulaError::syntax(
                self.pos,
                format!(
                    "cell reference '{}' is missing a row number",
                    &self.input[start..self.pos]
                ),
            ));
        }

        Ok(Token::new(
            TokenType::CellReference,
            &self.input[start..self.pos],
            start,
        ))
    }

    // === Helper methods ===

    /// Advance over a run of ASCII digits, returning how many were consumed
    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
        self.pos - start
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}
