//! Operation binder.
//!
//! Binds a row operation and its adapters into a host entry point with a
//! fixed columnar calling convention, plus the declared argument and return
//! types the host registers it under.

mod cast;
mod scalar;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VexecError};
use crate::executor::CastMode;
use crate::types::LogicalType;
use crate::vector::{DataChunk, Vector};

pub use cast::{CastOperation, StandardCastFunction};
pub use scalar::{BinaryFunction, BinaryOperation, UnaryFunction, UnaryOperation};

/// Entry point of a scalar function: input columns in, one output column.
pub type ScalarFunctionPtr = fn(&DataChunk, &mut Vector) -> Result<()>;

/// Entry point of a cast: `count` rows of `input` into `output`.
pub type CastFunctionPtr = fn(&CastInfo, usize, &Vector, &mut Vector) -> Result<()>;

/// Per-call information the host passes to a cast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CastInfo {
    mode: CastMode,
}

impl CastInfo {
    #[must_use]
    pub fn new(mode: CastMode) -> Self {
        CastInfo { mode }
    }

    #[must_use]
    pub fn mode(&self) -> CastMode {
        self.mode
    }
}

/// Declared types of a bound function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub arguments: Vec<LogicalType>,
    pub return_type: LogicalType,
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{argument}")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

/// A bound scalar function.
pub trait ScalarFunction: Send + Sync {
    /// Declared argument types, in order.
    fn arguments(&self) -> Vec<LogicalType>;

    fn return_type(&self) -> LogicalType;

    /// The host entry point.
    fn function(&self) -> ScalarFunctionPtr;

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            arguments: self.arguments(),
            return_type: self.return_type(),
        }
    }
}

/// A bound cast.
pub trait CastFunction: Send + Sync {
    fn source_type(&self) -> LogicalType;

    fn target_type(&self) -> LogicalType;

    /// Cost the host uses to rank implicit casts; negative if the cast is
    /// explicit only.
    fn implicit_cast_cost(&self) -> i64;

    /// The host entry point.
    fn function(&self) -> CastFunctionPtr;

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            arguments: vec![self.source_type()],
            return_type: self.target_type(),
        }
    }
}

/// Checks that `args` has the column count a function declares.
fn check_argument_count(args: &DataChunk, expected: usize) -> Result<()> {
    if args.column_count() != expected {
        return Err(VexecError::ArgumentCountMismatch {
            expected,
            actual: args.column_count(),
        });
    }
    Ok(())
}
