//! Formula expression tree types

use cellcalc_core::CellAddress;
use std::collections::BTreeSet;
use std::fmt;

/// Formula expression tree
///
/// Each node exclusively owns its children, so a tree can never contain a cycle.
/// Cycles only arise between cells and are handled by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Literal(f64),
    /// Single cell reference
    CellRef(CellAddress),
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Prefix unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    pub fn symbol(self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
}

impl UnaryOperator {
    pub fn symbol(self) -> char {
        match self {
            UnaryOperator::Negate => '-',
            UnaryOperator::Plus => '+',
        }
    }
}

const UNARY_PRECEDENCE: u8 = 3;
const PRIMARY_PRECEDENCE: u8 = 4;

impl Expr {
    /// Build a binary node
    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Build a unary node
    pub fn unary(op: UnaryOperator, operand: Expr) -> Self {
        Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    /// Distinct cell addresses referenced anywhere in the tree
    pub fn references(&self) -> BTreeSet<CellAddress> {
        let mut refs = BTreeSet::new();
        let mut pending = vec![self];

        while let Some(expr) = pending.pop() {
            match expr {
                Expr::Literal(_) => {}
                Expr::CellRef(addr) => {
                    refs.insert(*addr);
                }
                Expr::BinaryOp { left, right, .. } => {
                    pending.push(right);
                    pending.push(left);
                }
                Expr::UnaryOp { operand, .. } => pending.push(operand),
            }
        }

        refs
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Literal(_) | Expr::CellRef(_) => PRIMARY_PRECEDENCE,
            Expr::BinaryOp { op, .. } => op.precedence(),
            Expr::UnaryOp { .. } => UNARY_PRECEDENCE,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Renders formula text that parses back to an equal tree, adding parentheses only
/// where precedence or left-associativity requires them.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(n) => write!(f, "{}", n),
            Expr::CellRef(addr) => write!(f, "{}", addr),
            Expr::BinaryOp { op, left, right } => {
                let prec = op.precedence();
                left.fmt_operand(f, left.precedence() < prec)?;
                write!(f, "{}", op.symbol())?;
                right.fmt_operand(f, right.precedence() <= prec)
            }
            Expr::UnaryOp { op, operand } => {
                write!(f, "{}", op.symbol())?;
                operand.fmt_operand(f, operand.precedence() < UNARY_PRECEDENCE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(a1: &str) -> Expr {
        Expr::CellRef(CellAddress::parse(a1).unwrap())
    }

    #[test]
    fn test_references_are_distinct_and_sorted() {
        // B2 + A1 * B2 - -A1
        let expr = Expr::binary(
            BinaryOperator::Subtract,
            Expr::binary(
                BinaryOperator::Add,
                cell("B2"),
                Expr::binary(BinaryOperator::Multiply, cell("A1"), cell("B2")),
            ),
            Expr::unary(UnaryOperator::Negate, cell("A1")),
        );

        let refs: Vec<String> = expr.references().iter().map(|a| a.to_string()).collect();
        assert_eq!(refs, vec!["A1", "B2"]);
    }

    #[test]
    fn test_literal_has_no_references() {
        assert!(Expr::Literal(4.0).references().is_empty());
    }

    #[test]
    fn test_display_parenthesizes_only_when_needed() {
        let sum = Expr::binary(BinaryOperator::Add, Expr::Literal(2.0), Expr::Literal(3.0));
        let product = Expr::binary(BinaryOperator::Multiply, sum.clone(), Expr::Literal(4.0));
        assert_eq!(product.to_string(), "(2+3)*4");

        let right_nested = Expr::binary(BinaryOperator::Subtract, Expr::Literal(1.0), sum);
        assert_eq!(right_nested.to_string(), "1-(2+3)");

        let negated = Expr::unary(UnaryOperator::Negate, cell("A1"));
        assert_eq!(negated.to_string(), "-A1");

        let negated_sum = Expr::unary(
            UnaryOperator::Negate,
            Expr::binary(BinaryOperator::Add, cell("A1"), Expr::Literal(0.5)),
        );
        assert_eq!(negated_sum.to_string(), "-(A1+0.5)");
    }
}
