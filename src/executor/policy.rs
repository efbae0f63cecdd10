//! Error policies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a cast invocation treats row errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastMode {
    /// The first row error fails the cast.
    #[default]
    Normal,
    /// Row errors null the row, are annotated on the output and the cast continues.
    Try,
}

/// What the row loop does after a row error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowControl {
    Continue,
    Abort,
}

/// Row error handling for one invocation.
///
/// Scalar functions run [`ErrorPolicy::Strict`]; casts run
/// [`ErrorPolicy::Cast`] with the host's mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ErrorPolicy {
    #[default]
    Strict,
    Cast(CastMode),
}

impl ErrorPolicy {
    /// Decides whether the row loop continues after a row error.
    #[must_use]
    pub fn on_row_error(self) -> RowControl {
        match self {
            ErrorPolicy::Cast(CastMode::Try) => RowControl::Continue,
            ErrorPolicy::Strict | ErrorPolicy::Cast(CastMode::Normal) => RowControl::Abort,
        }
    }

    /// Returns true when row errors are recorded on the output vector.
    #[must_use]
    pub fn annotates_rows(self) -> bool {
        matches!(self, ErrorPolicy::Cast(_))
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ErrorPolicy::Strict => "strict",
            ErrorPolicy::Cast(CastMode::Normal) => "cast",
            ErrorPolicy::Cast(CastMode::Try) => "try_cast",
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<CastMode> for ErrorPolicy {
    fn from(mode: CastMode) -> Self {
        ErrorPolicy::Cast(mode)
    }
}
