//! Per-row outcomes of a row operation.

use std::num::TryFromIntError;
use std::str::Utf8Error;

use thiserror::Error;

use crate::types::HugeintError;

/// A failure raised by a row operation for one row.
///
/// The active [`ErrorPolicy`](super::ErrorPolicy) decides whether it aborts
/// the batch or is recorded on the row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RowError {
    message: String,
}

impl RowError {
    pub fn new(message: impl Into<String>) -> Self {
        RowError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn into_message(self) -> String {
        self.message
    }
}

impl From<String> for RowError {
    fn from(message: String) -> Self {
        RowError { message }
    }
}

impl From<&str> for RowError {
    fn from(message: &str) -> Self {
        RowError::new(message)
    }
}

impl From<HugeintError> for RowError {
    fn from(error: HugeintError) -> Self {
        RowError::new(error.to_string())
    }
}

impl From<Utf8Error> for RowError {
    fn from(error: Utf8Error) -> Self {
        RowError::new(error.to_string())
    }
}

impl From<TryFromIntError> for RowError {
    fn from(error: TryFromIntError) -> Self {
        RowError::new(error.to_string())
    }
}

/// Outcome of one row: `Ok(Some(v))` is a value, `Ok(None)` is null and
/// `Err` is a row error.
pub type RowResult<T> = std::result::Result<Option<T>, RowError>;
