//! Value adapters.
//!
//! An adapter binds a logical type to the per-row values an operation sees.
//! Reading is split into a per-batch [`ReadAdapter::prepare`] step and cheap
//! per-row `is_valid`/`read` calls; writing goes through a [`RowWriter`]
//! prepared once per output batch.

mod primitive;
mod structure;
mod varchar;

pub use primitive::{Primitive, PrimitiveState, PrimitiveWriter};
pub use structure::{FieldNames, Struct, StructState, StructWriter, Unnamed};
pub use varchar::{Varchar, VarcharState, VarcharWriter};

use crate::error::Result;
use crate::types::LogicalType;
use crate::vector::{ensure_writable, ValidityMask, Vector};

/// Declares the logical type and the owned value type of an adapter.
pub trait ValueAdapter: 'static {
    /// The value an operation produces for one row.
    type Value;

    /// The logical type of vectors this adapter reads and writes.
    fn logical_type() -> LogicalType;
}

/// Reads rows out of an input vector.
pub trait ReadAdapter<'a>: ValueAdapter {
    /// The value handed to an operation for one valid row.
    type Arg;

    /// Per-batch view of the input vector.
    type State;

    /// Builds the read state for the first `count` rows of `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` does not have this adapter's layout or
    /// holds fewer than `count` rows.
    fn prepare(input: &'a Vector, count: usize) -> Result<Self::State>;

    /// Returns true when `row` is not null.
    fn is_valid(state: &Self::State, row: usize) -> bool;

    /// Reads `row`. Only called for rows where `is_valid` holds.
    fn read(state: &Self::State, row: usize) -> Self::Arg;
}

/// Writes rows into an output vector.
pub trait RowWriter {
    type Value;

    /// Marks `row` null.
    fn set_null(&mut self, row: usize);

    /// Stores `value` at `row`.
    fn write(&mut self, row: usize, value: Self::Value);
}

/// Prepares an output vector for writing.
pub trait WriteAdapter<'v>: ValueAdapter {
    type Writer: RowWriter<Value = Self::Value>;

    /// Borrows `output` for writing its first `count` rows.
    ///
    /// # Errors
    ///
    /// Returns an error if `output` does not have this adapter's layout or
    /// cannot hold `count` rows.
    fn prepare_write(output: &'v mut Vector, count: usize) -> Result<Self::Writer>;
}

/// Validity of an output vector, materialized on the first null.
#[derive(Debug)]
pub struct LazyValidity<'v> {
    slot: &'v mut Option<ValidityMask>,
    len: usize,
}

impl<'v> LazyValidity<'v> {
    pub(crate) fn new(slot: &'v mut Option<ValidityMask>, len: usize) -> Self {
        LazyValidity { slot, len }
    }

    /// Marks `row` null, creating the mask if needed.
    #[inline]
    pub fn set_invalid(&mut self, row: usize) {
        ensure_writable(self.slot, self.len).set_invalid(row);
    }

    /// Marks `row` valid. A vector without a mask is already all valid.
    #[inline]
    pub fn set_valid(&mut self, row: usize) {
        if let Some(mask) = self.slot.as_mut() {
            mask.set_valid(row);
        }
    }

    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.slot.is_some()
    }
}

/// Returns true when `row` is valid under an optional mask.
#[inline]
pub(crate) fn row_is_valid(validity: Option<&ValidityMask>, row: usize) -> bool {
    validity.map_or(true, |mask| mask.is_valid(row))
}
