//! # cellcalc-core
//!
//! Core data structures for the cellcalc spreadsheet engine.
//!
//! This crate provides:
//! - [`CellAddress`] - A1-style cell addressing
//! - [`Sheet`] - Raw cell text storage, the input to an evaluation pass
//!
//! ## Example
//!
//! ```rust
//! use cellcalc_core::{CellAddress, Sheet};
//!
//! let mut sheet = Sheet::new();
//! sheet.set_cell_a1("A1", "2").unwrap();
//! sheet.set_cell_a1("B1", "A1*3").unwrap();
//!
//! let b1 = CellAddress::parse("B1").unwrap();
//! assert_eq!(sheet.cell(b1), Some("A1*3"));
//! ```

pub mod address;
pub mod error;
pub mod sheet;

pub use address::CellAddress;
pub use error::{Error, Result};
pub use sheet::Sheet;
