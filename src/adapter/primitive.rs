//! Adapter for fixed-width columns.

use std::marker::PhantomData;

use super::{row_is_valid, LazyValidity, ReadAdapter, RowWriter, ValueAdapter, WriteAdapter};
use crate::error::{Result, VexecError};
use crate::types::LogicalType;
use crate::vector::{PhysicalType, ValidityMask, Vector, VectorPartsMut};

/// Reads and writes a column of `T` directly, e.g. `Primitive<u8>` for UTINYINT.
#[derive(Debug, Clone, Copy, Default)]
pub struct Primitive<T>(PhantomData<fn() -> T>);

impl<T: PhysicalType> ValueAdapter for Primitive<T> {
    type Value = T;

    fn logical_type() -> LogicalType {
        T::logical_type()
    }
}

/// Borrowed values and validity of one input batch.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveState<'a, T> {
    values: &'a [T],
    validity: Option<&'a ValidityMask>,
}

impl<'a, T: PhysicalType> ReadAdapter<'a> for Primitive<T> {
    type Arg = T;
    type State = PrimitiveState<'a, T>;

    fn prepare(input: &'a Vector, count: usize) -> Result<Self::State> {
        input.check_count(count)?;
        let values = input.values::<T>()?;
        Ok(PrimitiveState {
            values: &values[..count],
            validity: input.validity(),
        })
    }

    #[inline]
    fn is_valid(state: &Self::State, row: usize) -> bool {
        row_is_valid(state.validity, row)
    }

    #[inline]
    fn read(state: &Self::State, row: usize) -> T {
        state.values[row]
    }
}

/// Writes `T` values into an output column.
#[derive(Debug)]
pub struct PrimitiveWriter<'v, T> {
    values: &'v mut [T],
    validity: LazyValidity<'v>,
}

impl<'v, T: PhysicalType> WriteAdapter<'v> for Primitive<T> {
    type Writer = PrimitiveWriter<'v, T>;

    fn prepare_write(output: &'v mut Vector, count: usize) -> Result<Self::Writer> {
        output.check_count(count)?;
        let VectorPartsMut {
            logical_type,
            data,
            validity,
            capacity,
        } = output.parts_mut();
        let Some(values) = T::values_mut(data) else {
            return Err(VexecError::TypeMismatch {
                expected: T::logical_type().to_string(),
                actual: logical_type.to_string(),
            });
        };
        Ok(PrimitiveWriter {
            values,
            validity: LazyValidity::new(validity, capacity),
        })
    }
}

impl<T: PhysicalType> RowWriter for PrimitiveWriter<'_, T> {
    type Value = T;

    #[inline]
    fn set_null(&mut self, row: usize) {
        self.validity.set_invalid(row);
    }

    #[inline]
    fn write(&mut self, row: usize, value: T) {
        self.values[row] = value;
        self.validity.set_valid(row);
    }
}
