//! # cellcalc
//!
//! Evaluate a grid of cells holding numbers or arithmetic formulas that reference other
//! cells, producing a fully resolved view of the sheet.
//!
//! ## Features
//!
//! - Formulas with `+ - * /`, unary minus/plus, parentheses and A1-style references
//! - Dependency ordering with circular reference detection
//! - Per-cell errors: a failing cell never stops the rest of the sheet
//! - Optional layer-parallel recalculation (`parallel` feature)
//! - CSV input/output and an aligned text grid printer
//!
//! ## Example
//!
//! ```rust
//! use cellcalc::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! sheet.set_cell_a1("A1", "10").unwrap();
//! sheet.set_cell_a1("A2", "A1*2").unwrap();
//! sheet.set_cell_a1("A3", "A2/0").unwrap();
//! sheet.set_cell_a1("A4", "A3+1").unwrap();
//!
//! let result = sheet.calculate();
//! assert_eq!(result.get("A2"), Ok(20.0));
//! assert_eq!(result.get("A3"), Err(FormulaError::DivisionByZero));
//! assert!(matches!(result.get("A4"), Err(FormulaError::DependencyFailed(_))));
//! ```

pub mod calculation;
pub mod prelude;
pub mod print;

pub use calculation::{
    format_number, CalculationOptions, CalculationStats, EvaluatedSheet, RecalcMode,
    SheetCalculationExt,
};
pub use print::render_grid;

// Re-export core types
pub use cellcalc_core::{CellAddress, Error, Result, Sheet};

// Re-export formula types
pub use cellcalc_formula::{
    evaluate, parse_formula, tokenize, BinaryOperator, DependencyGraph, Expr, FormulaError,
    FormulaResult, Schedule, Token, TokenType, UnaryOperator, ValueCache,
};

// Re-export I/O types
pub use cellcalc_csv::{CsvError, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
