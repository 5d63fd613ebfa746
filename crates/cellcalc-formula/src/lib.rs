//! # cellcalc-formula
//!
//! Arithmetic formula engine for cellcalc.
//!
//! This crate provides:
//! - Tokenizing (text → tokens)
//! - Parsing (tokens → expression tree)
//! - Dependency graphs and cycle-safe scheduling across cells
//! - Evaluation (expression tree → number) against a per-pass value cache
//!
//! ## Example
//!
//! ```rust
//! use cellcalc_formula::{evaluate, parse_formula, ValueCache};
//!
//! let expr = parse_formula("(2+3)*4").unwrap();
//! let value = evaluate(&expr, &ValueCache::new()).unwrap();
//! assert_eq!(value, 20.0);
//! ```

pub mod ast;
pub mod cache;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod scheduler;
pub mod token;
pub mod tokenizer;

pub use ast::{BinaryOperator, Expr, UnaryOperator};
pub use cache::ValueCache;
pub use dependency::DependencyGraph;
pub use error::{FormulaError, FormulaResult};
pub use evaluator::evaluate;
pub use parser::{parse, parse_formula};
pub use scheduler::{order, schedule, Schedule};
pub use token::{Token, TokenType};
pub use tokenizer::tokenize;
