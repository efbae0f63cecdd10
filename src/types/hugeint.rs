//! Signed 128-bit integer value type.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overflow raised by checked [`Hugeint`] arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HugeintError {
    #[error("Failed to add hugeint: out of range")]
    AddOverflow,
    #[error("Failed to subtract hugeint: out of range")]
    SubtractOverflow,
    #[error("Failed to negate hugeint: out of range")]
    NegateOverflow,
}

/// Signed 128-bit integer stored as an `(upper, lower)` pair.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Hugeint(i128);

impl Hugeint {
    pub const MIN: Hugeint = Hugeint(i128::MIN);
    pub const MAX: Hugeint = Hugeint(i128::MAX);

    /// Builds a value from its upper (signed) and lower (unsigned) halves.
    #[must_use]
    pub fn from_parts(upper: i64, lower: u64) -> Self {
        Hugeint((i128::from(upper) << 64) | i128::from(lower))
    }

    /// Upper 64 bits, carrying the sign.
    #[must_use]
    pub fn upper(self) -> i64 {
        (self.0 >> 64) as i64
    }

    /// Lower 64 bits.
    #[must_use]
    pub fn lower(self) -> u64 {
        self.0 as u64
    }

    /// Returns the value as a native `i128`.
    #[must_use]
    pub fn as_i128(self) -> i128 {
        self.0
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`HugeintError::AddOverflow`] when the sum does not fit.
    pub fn add(self, rhs: Hugeint) -> Result<Hugeint, HugeintError> {
        self.0
            .checked_add(rhs.0)
            .map(Hugeint)
            .ok_or(HugeintError::AddOverflow)
    }

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`HugeintError::SubtractOverflow`] when the difference does not fit.
    pub fn subtract(self, rhs: Hugeint) -> Result<Hugeint, HugeintError> {
        self.0
            .checked_sub(rhs.0)
            .map(Hugeint)
            .ok_or(HugeintError::SubtractOverflow)
    }

    /// Checked negation; only `Hugeint::MIN` fails.
    ///
    /// # Errors
    ///
    /// Returns [`HugeintError::NegateOverflow`] for `Hugeint::MIN`.
    pub fn negate(self) -> Result<Hugeint, HugeintError> {
        self.0
            .checked_neg()
            .map(Hugeint)
            .ok_or(HugeintError::NegateOverflow)
    }
}

impl From<i64> for Hugeint {
    fn from(value: i64) -> Self {
        Hugeint(i128::from(value))
    }
}

impl From<i128> for Hugeint {
    fn from(value: i128) -> Self {
        Hugeint(value)
    }
}

impl fmt::Display for Hugeint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
