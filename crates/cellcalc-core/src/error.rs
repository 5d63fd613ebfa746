//! Error types for cellcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cellcalc-core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Column letters encode a column index that does not fit
    #[error("Column '{0}' is out of range")]
    ColumnOutOfRange(String),

    /// Row number does not fit
    #[error("Row '{0}' is out of range")]
    RowOutOfRange(String),
}
