//! Prelude module for convenient imports
//!
//! ```rust
//! use cellcalc::prelude::*;
//! ```

pub use crate::calculation::{
    CalculationOptions, EvaluatedSheet, RecalcMode, SheetCalculationExt,
};
pub use crate::{CellAddress, FormulaError, FormulaResult, Sheet};
