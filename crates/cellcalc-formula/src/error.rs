//! Formula error types

use cellcalc_core::CellAddress;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while tokenizing, parsing, scheduling or evaluating a formula
///
/// Errors are plain data: an evaluation pass caches them per cell so dependents can
/// observe a failed precedent without unwinding the pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// No token or tree can be derived from the text
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// A number token is not a valid decimal
    #[error("Invalid number '{0}'")]
    Format(String),

    /// A formula references a cell with no content
    #[error("Reference to empty cell {0}")]
    UndefinedReference(CellAddress),

    /// The cell lies on a dependency cycle
    #[error("Circular reference involving cell {0}")]
    CircularReference(CellAddress),

    /// Runtime division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// A referenced cell is itself in error
    #[error("Dependency {0} failed")]
    DependencyFailed(CellAddress),
}

impl FormulaError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        FormulaError::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Short marker shown in place of a value in a rendered grid
    pub fn marker(&self) -> &'static str {
        match self {
            FormulaError::Syntax { .. } => "#SYNTAX!",
            FormulaError::Format(_) => "#NUM!",
            FormulaError::UndefinedReference(_) => "#REF!",
            FormulaError::CircularReference(_) => "#CIRC!",
            FormulaError::DivisionByZero => "#DIV/0!",
            FormulaError::DependencyFailed(_) => "#DEP!",
        }
    }
}
