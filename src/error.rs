//! Error types for vexec operations.

use thiserror::Error;

/// Result type alias using [`VexecError`].
pub type Result<T> = std::result::Result<T, VexecError>;

/// Error types for vexec operations.
///
/// Per-row failures raised by a row operation are [`crate::executor::RowError`],
/// not this type. A `VexecError` is either a contract violation detected before
/// the row loop starts, or the batch failure a strict invocation reports.
#[derive(Debug, Error)]
pub enum VexecError {
    // ==================== Contract Violations ====================
    /// A column's physical layout does not match the adapter reading it.
    #[error("Type error: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Child access on a type without children.
    #[error("Not a nested type: {0}")]
    NotNested(String),

    /// Child access past the declared child count.
    #[error("Child index {index} out of range for type with {count} children")]
    ChildIndexOutOfRange { index: usize, count: usize },

    /// A batch asked for more rows than a column holds.
    #[error("Row count {count} exceeds vector capacity {capacity}")]
    RowCountOutOfBounds { count: usize, capacity: usize },

    /// A data chunk does not carry the number of columns a function declares.
    #[error("Argument count mismatch: expected {expected}, got {actual}")]
    ArgumentCountMismatch { expected: usize, actual: usize },

    // ==================== Batch Failures ====================
    /// A row operation failed and the active error policy aborted the batch.
    #[error("Execution error at row {row}: {message}")]
    RowFailed { row: usize, message: String },

    // ==================== Host Interchange ====================
    /// The host handed over a type this engine has no layout for.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Invalid executor configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Arrow conversion failure.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl VexecError {
    /// Returns true for errors that indicate a mismatched static type contract.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            VexecError::TypeMismatch { .. }
                | VexecError::NotNested(_)
                | VexecError::ChildIndexOutOfRange { .. }
                | VexecError::RowCountOutOfBounds { .. }
                | VexecError::ArgumentCountMismatch { .. }
        )
    }

    /// Returns the row operation's message for a batch failure.
    #[must_use]
    pub fn row_message(&self) -> Option<&str> {
        match self {
            VexecError::RowFailed { message, .. } => Some(message),
            _ => None,
        }
    }
}
