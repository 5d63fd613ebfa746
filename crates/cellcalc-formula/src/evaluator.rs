//! Formula evaluator
//!
//! Evaluates expression trees to numbers against the cache of cells already resolved in
//! the current pass.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::cache::ValueCache;
use crate::error::{FormulaError, FormulaResult};

/// Evaluate an expression tree
///
/// Cell references are looked up in `cache`, which the scheduler's ordering guarantees is
/// already populated for every referenced cell with content:
///
/// - a reference missing from the cache fails with [`FormulaError::UndefinedReference`]
/// - a reference to a failed cell fails with [`FormulaError::DependencyFailed`], without
///   repeating the root cause
/// - `/` with a right operand of zero fails with [`FormulaError::DivisionByZero`]
///
/// Binary operands are evaluated left before right, so the leftmost failure is reported.
pub fn evaluate(expr: &Expr, cache: &ValueCache) -> FormulaResult<f64> {
    match expr {
        Expr::Literal(n) => Ok(*n),

        Expr::CellRef(addr) => match cache.get(*addr) {
            Some(Ok(n)) => Ok(*n),
            Some(Err(_)) => Err(FormulaError::DependencyFailed(*addr)),
            None => Err(FormulaError::UndefinedReference(*addr)),
        },

        Expr::BinaryOp { op, left, right } => {
            let left = evaluate(left, cache)?;
            let right = evaluate(right, cache)?;
            apply_binary(*op, left, right)
        }

        Expr::UnaryOp { op, operand } => {
            let value = evaluate(operand, cache)?;
            Ok(match op {
                UnaryOperator::Negate => -value,
                UnaryOperator::Plus => value,
            })
        }
    }
}

fn apply_binary(op: BinaryOperator, left: f64, right: f64) -> FormulaResult<f64> {
    match op {
        BinaryOperator::Add => Ok(left + right),
        BinaryOperator::Subtract => Ok(left - right),
        BinaryOperator::Multiply => Ok(left * right),
        BinaryOperator::Divide => {
            if right == 0.0 {
                Err(FormulaError::DivisionByZero)
            } else {
                Ok(left / right)
            }
        }
    }
}
