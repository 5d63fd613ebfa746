//! # cellcalc-csv
//!
//! Loads sheets of cell text from CSV and writes value grids back out.
//!
//! ```
//! use cellcalc_csv::{CsvReadOptions, CsvReader};
//!
//! let sheet = CsvReader::read("1,A1*2\n".as_bytes(), &CsvReadOptions::default()).unwrap();
//! assert_eq!(sheet.len(), 2);
//! ```

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::CsvReader;
pub use writer::CsvWriter;
