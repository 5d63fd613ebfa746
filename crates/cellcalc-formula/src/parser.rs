//! Formula parser
//!
//! A recursive descent parser over the token sequence with proper operator precedence.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::token::{Token, TokenType};
use crate::tokenizer::tokenize;
use cellcalc_core::CellAddress;

/// Deepest allowed expression tree
///
/// Parentheses, prefix operators and every binary operator folded into a chain each count
/// as one level, so `1+1+...+1` is bounded just like `((((1))))`. Evaluating, printing and
/// dropping a tree recurse along its depth.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Tokenize and parse formula text into an expression tree
///
/// A single leading `=` is optional, so `"=A1+1"` and `"A1+1"` are the same formula.
///
/// # Example
/// ```rust
/// use cellcalc_formula::{parse_formula, Expr};
///
/// let expr = parse_formula("=1+2*3").unwrap();
/// assert_eq!(expr.to_string(), "1+2*3");
/// assert_eq!(parse_formula("42").unwrap(), Expr::Literal(42.0));
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<Expr> {
    let trimmed = formula.trim_start();
    let offset = formula.len() - trimmed.len();

    let (body, offset) = match trimmed.strip_prefix('=') {
        Some(rest) => (rest, offset + 1),
        None => (trimmed, offset),
    };

    let tokens = tokenize(body).map_err(|e| shift_position(e, offset))?;
    parse(&tokens).map_err(|e| shift_position(e, offset))
}

/// Parse a lone cell reference such as `"B7"`
///
/// Anything other than exactly one cell reference token (`"12"`, `"A"`, `"A1+1"`) is a
/// syntax error.
pub fn parse_reference(text: &str) -> FormulaResult<CellAddress> {
    let tokens = tokenize(text)?;
    match tokens.as_slice() {
        [token] if token.kind == TokenType::CellReference => to_address(token),
        [] => Err(FormulaError::syntax(0, "expected a cell reference")),
        [token, ..] => Err(FormulaError::syntax(
            token.position,
            format!("expected a cell reference, found '{}'", text.trim()),
        )),
    }
}

/// Parse a token sequence into an expression tree
///
/// The whole sequence must form exactly one expression.
pub fn parse(tokens: &[Token]) -> FormulaResult<Expr> {
    let mut parser = Parser::new(tokens);

    if tokens.is_empty() {
        return Err(FormulaError::syntax(0, "empty formula"));
    }

    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if let Some(token) = parser.current() {
        return Err(FormulaError::syntax(
            token.position,
            format!("unexpected '{}' after expression", token.text),
        ));
    }

    Ok(expr)
}

fn shift_position(error: FormulaError, offset: usize) -> FormulaError {
    match error {
        FormulaError::Syntax { position, message } => FormulaError::Syntax {
            position: position + offset,
            message,
        },
        other => other,
    }
}

fn to_address(token: &Token) -> FormulaResult<CellAddress> {
    CellAddress::parse(&token.text)
        .map_err(|e| FormulaError::syntax(token.position, e.to_string()))
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // === Token access ===

    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<TokenType> {
        self.current().map(|t| t.kind)
    }

    fn consume(&mut self) -> Option<&'a Token> {
        let token = self.current();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Byte offset just past the last token, used for end-of-input errors
    fn end_position(&self) -> usize {
        self.tokens
            .last()
            .map_or(0, |t| t.position + t.text.len())
    }

    fn enter(&mut self) -> FormulaResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            let position = self.current().map_or(self.end_position(), |t| t.position);
            return Err(FormulaError::syntax(
                position,
                format!("expression nested deeper than {} levels", MAX_NESTING_DEPTH),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.leave_by(1);
    }

    fn leave_by(&mut self, levels: usize) {
        self.depth -= levels;
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary: -, +
    // 4. Primary: numbers, references, parentheses

    fn parse_expression(&mut self) -> FormulaResult<Expr> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        let mut folded = 0;

        loop {
            let op = match self.current_kind() {
                Some(TokenType::Plus) => BinaryOperator::Add,
                Some(TokenType::Minus) => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            // Each fold deepens the left spine of the tree by one level
            self.enter()?;
            folded += 1;
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }

        self.leave_by(folded);
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;
        let mut folded = 0;

        loop {
            let op = match self.current_kind() {
                Some(TokenType::Star) => BinaryOperator::Multiply,
                Some(TokenType::Slash) => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            self.enter()?;
            folded += 1;
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }

        self.leave_by(folded);
        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        let op = match self.current_kind() {
            Some(TokenType::Minus) => UnaryOperator::Negate,
            Some(TokenType::Plus) => UnaryOperator::Plus,
            _ => return self.parse_primary(),
        };

        self.consume();
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();

        Ok(Expr::unary(op, operand))
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        let token = match self.consume() {
            Some(token) => token,
            None => {
                return Err(FormulaError::syntax(
                    self.end_position(),
                    "unexpected end of formula, expected an operand",
                ))
            }
        };

        match token.kind {
            TokenType::Number => match token.text.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Expr::Literal(n)),
                _ => Err(FormulaError::Format(token.text.clone())),
            },

            TokenType::CellReference => to_address(token).map(Expr::CellRef),

            TokenType::LeftParen => {
                self.enter()?;
                let expr = self.parse_expression()?;
                self.leave();

                match self.consume() {
                    Some(t) if t.kind == TokenType::RightParen => Ok(expr),
                    Some(t) => Err(FormulaError::syntax(
                        t.position,
                        format!("expected ')', found '{}'", t.text),
                    )),
                    None => Err(FormulaError::syntax(
                        self.end_position(),
                        format!("missing ')' for '(' at position {}", token.position),
                    )),
                }
            }

            _ => Err(FormulaError::syntax(
                token.position,
                format!("expected an operand, found '{}'", token.text),
            )),
        }
    }
}
