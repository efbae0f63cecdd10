//! Adapter for STRUCT columns.
//!
//! `Struct<(A, B), N>` composes child adapters into a tuple-valued adapter.
//! A null struct row does not read its children; setting a struct row null
//! also nulls that row in every child.

use std::marker::PhantomData;

use super::{row_is_valid, LazyValidity, ReadAdapter, RowWriter, ValueAdapter, WriteAdapter};
use crate::error::{Result, VexecError};
use crate::types::LogicalType;
use crate::vector::{ValidityMask, Vector, VectorData, VectorPartsMut};

/// Field names of a struct adapter.
pub trait FieldNames: 'static {
    /// Explicit names, by position. Missing positions fall back to `v1`, `v2`, ...
    const NAMES: &'static [&'static str] = &[];

    #[must_use]
    fn field_name(index: usize) -> String {
        Self::NAMES
            .get(index)
            .map_or_else(|| format!("v{}", index + 1), |name| (*name).to_string())
    }
}

/// Positional field names `v1`, `v2`, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct Unnamed;

impl FieldNames for Unnamed {}

/// Composite adapter over a tuple of child adapters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Struct<F, N = Unnamed>(PhantomData<fn() -> (F, N)>);

/// Struct validity plus the read states of each child.
#[derive(Debug, Clone, Copy)]
pub struct StructState<'a, S> {
    validity: Option<&'a ValidityMask>,
    fields: S,
}

/// Struct validity plus the writers of each child.
#[derive(Debug)]
pub struct StructWriter<'v, W> {
    validity: LazyValidity<'v>,
    fields: W,
}

fn struct_children<'a, S: ValueAdapter>(input: &'a Vector, arity: usize) -> Result<&'a [Vector]> {
    match input.struct_children() {
        Ok(children) if children.len() == arity => Ok(children),
        _ => Err(input.mismatch(&S::logical_type())),
    }
}

macro_rules! impl_struct_adapter {
    ($arity:expr; $($field:ident $var:ident $idx:tt),+) => {
        impl<N: FieldNames, $($field: ValueAdapter),+> ValueAdapter for Struct<($($field,)+), N> {
            type Value = ($($field::Value,)+);

            fn logical_type() -> LogicalType {
                LogicalType::structure(vec![$((N::field_name($idx), $field::logical_type())),+])
            }
        }

        impl<'a, N: FieldNames, $($field: ReadAdapter<'a>),+> ReadAdapter<'a>
            for Struct<($($field,)+), N>
        {
            type Arg = ($($field::Arg,)+);
            type State = StructState<'a, ($($field::State,)+)>;

            fn prepare(input: &'a Vector, count: usize) -> Result<Self::State> {
                input.check_count(count)?;
                let children = struct_children::<Self>(input, $arity)?;
                Ok(StructState {
                    validity: input.validity(),
                    fields: ($($field::prepare(&children[$idx], count)?,)+),
                })
            }

            #[inline]
            fn is_valid(state: &Self::State, row: usize) -> bool {
                row_is_valid(state.validity, row)
            }

            #[inline]
            fn read(state: &Self::State, row: usize) -> Self::Arg {
                ($($field::read(&state.fields.$idx, row),)+)
            }
        }

        impl<'v, N: FieldNames, $($field: WriteAdapter<'v>),+> WriteAdapter<'v>
            for Struct<($($field,)+), N>
        {
            type Writer = StructWriter<'v, ($($field::Writer,)+)>;

            fn prepare_write(output: &'v mut Vector, count: usize) -> Result<Self::Writer> {
                output.check_count(count)?;
                let VectorPartsMut { logical_type, data, validity, capacity } = output.parts_mut();
                let mismatch = || VexecError::TypeMismatch {
                    expected: Self::logical_type().to_string(),
                    actual: logical_type.to_string(),
                };
                let VectorData::Struct(children) = data else {
                    return Err(mismatch());
                };
                let [$($var),+] = children.as_mut_slice() else {
                    return Err(mismatch());
                };
                Ok(StructWriter {
                    validity: LazyValidity::new(validity, capacity),
                    fields: ($($field::prepare_write($var, count)?,)+),
                })
            }
        }

        impl<$($field: RowWriter),+> RowWriter for StructWriter<'_, ($($field,)+)> {
            type Value = ($($field::Value,)+);

            fn set_null(&mut self, row: usize) {
                self.validity.set_invalid(row);
                $(self.fields.$idx.set_null(row);)+
            }

            fn write(&mut self, row: usize, value: Self::Value) {
                let ($($var,)+) = value;
                $(self.fields.$idx.write(row, $var);)+
                self.validity.set_valid(row);
            }
        }
    };
}

impl_struct_adapter!(1; A a 0);
impl_struct_adapter!(2; A a 0, B b 1);
impl_struct_adapter!(3; A a 0, B b 1, C c 2);
impl_struct_adapter!(4; A a 0, B b 1, C c 2, D d 3);
