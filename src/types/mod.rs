//! Logical types and the value types adapters read and write.

mod hugeint;
mod logical_type;
mod string;

pub use hugeint::{Hugeint, HugeintError};
pub use logical_type::{LogicalType, LogicalTypeId, HUGEINT_DECIMAL_PRECISION};
pub use string::{StringT, INLINE_LENGTH};
