//! Adapter for VARCHAR columns.

use super::{row_is_valid, LazyValidity, ReadAdapter, RowWriter, ValueAdapter, WriteAdapter};
use crate::error::{Result, VexecError};
use crate::types::{LogicalType, StringT};
use crate::vector::{StringVector, ValidityMask, Vector, VectorData, VectorPartsMut};

/// Reads borrowed [`StringT`] views and writes owned strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Varchar;

impl ValueAdapter for Varchar {
    type Value = String;

    fn logical_type() -> LogicalType {
        LogicalType::varchar()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VarcharState<'a> {
    strings: &'a StringVector,
    validity: Option<&'a ValidityMask>,
}

impl<'a> ReadAdapter<'a> for Varchar {
    type Arg = StringT<'a>;
    type State = VarcharState<'a>;

    fn prepare(input: &'a Vector, count: usize) -> Result<Self::State> {
        input.check_count(count)?;
        Ok(VarcharState {
            strings: input.strings()?,
            validity: input.validity(),
        })
    }

    #[inline]
    fn is_valid(state: &Self::State, row: usize) -> bool {
        row_is_valid(state.validity, row)
    }

    #[inline]
    fn read(state: &Self::State, row: usize) -> StringT<'a> {
        state.strings.get(row)
    }
}

#[derive(Debug)]
pub struct VarcharWriter<'v> {
    strings: &'v mut StringVector,
    validity: LazyValidity<'v>,
}

impl<'v> WriteAdapter<'v> for Varchar {
    type Writer = VarcharWriter<'v>;

    fn prepare_write(output: &'v mut Vector, count: usize) -> Result<Self::Writer> {
        output.check_count(count)?;
        let VectorPartsMut {
            logical_type,
            data,
            validity,
            capacity,
        } = output.parts_mut();
        let VectorData::Varchar(strings) = data else {
            return Err(VexecError::TypeMismatch {
                expected: Self::logical_type().to_string(),
                actual: logical_type.to_string(),
            });
        };
        Ok(VarcharWriter {
            strings,
            validity: LazyValidity::new(validity, capacity),
        })
    }
}

impl RowWriter for VarcharWriter<'_> {
    type Value = String;

    fn set_null(&mut self, row: usize) {
        self.validity.set_invalid(row);
    }

    fn write(&mut self, row: usize, value: String) {
        self.strings.assign(row, value.as_bytes());
        self.validity.set_valid(row);
    }
}
