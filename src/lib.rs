//! vexec - Vectorized row execution
//!
//! Runs scalar row operations over columnar vectors with SQL null semantics,
//! struct values and per-row error handling.
//!
//! ```
//! use vexec::adapter::Primitive;
//! use vexec::executor::{ErrorPolicy, Executor, RowError};
//! use vexec::types::LogicalType;
//! use vexec::vector::Vector;
//!
//! let input = Vector::from_values(&[Some(3_u8), None, Some(255)]);
//! let mut output = Vector::new(LogicalType::utinyint(), 3);
//!
//! let result = Executor::new(ErrorPolicy::Strict).execute_unary::<Primitive<u8>, Primitive<u8>, _>(
//!     &input,
//!     &mut output,
//!     3,
//!     |value| value.checked_mul(2).map(Some).ok_or_else(|| RowError::new("out of range")),
//! );
//!
//! assert!(result.is_err());
//! assert_eq!(output.values::<u8>().unwrap()[0], 6);
//! assert!(!output.is_valid(1));
//! ```

pub mod adapter;
pub mod driver;
pub mod error;
pub mod executor;
pub mod function;
pub mod types;
pub mod vector;

pub use adapter::{Primitive, ReadAdapter, RowWriter, Struct, ValueAdapter, Varchar, WriteAdapter};
pub use driver::ArrowDriver;
pub use error::{Result, VexecError};
pub use executor::{
    CastMode, ErrorPolicy, ExecutionStats, Executor, ExecutorConfig, RowError, RowResult,
};
pub use function::{
    BinaryFunction, BinaryOperation, CastFunction, CastOperation, FunctionSignature,
    ScalarFunction, StandardCastFunction, UnaryFunction, UnaryOperation,
};
pub use types::{Hugeint, LogicalType, LogicalTypeId, StringT};
pub use vector::{DataChunk, RowErrorAnnotation, ValidityMask, Vector};
