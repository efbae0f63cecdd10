//! Conversion between vectors and Arrow arrays.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Decimal128Array, ListArray, PrimitiveArray, StringArray,
    StructArray, UInt32Array,
};
use arrow::buffer::{BooleanBuffer, NullBuffer, OffsetBuffer, ScalarBuffer};
use arrow::datatypes::{
    ArrowPrimitiveType, Field, Fields, Float64Type, Int32Type, Int64Type, UInt16Type, UInt8Type,
};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use super::{DataChunk, ListEntry, StringVector, ValidityMask, Vector, VectorData};
use crate::error::{Result, VexecError};
use crate::types::{Hugeint, LogicalType, LogicalTypeId, HUGEINT_DECIMAL_PRECISION};

fn downcast<'a, T: 'static>(array: &'a dyn Array, expected: &LogicalType) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| VexecError::TypeMismatch {
            expected: expected.to_string(),
            actual: format!("{:?}", array.data_type()),
        })
}

fn primitive_values<T: ArrowPrimitiveType>(
    array: &dyn Array,
    expected: &LogicalType,
) -> Result<Vec<T::Native>> {
    Ok(downcast::<PrimitiveArray<T>>(array, expected)?
        .values()
        .to_vec())
}

fn primitive_array<T: ArrowPrimitiveType>(
    values: &[T::Native],
    nulls: Option<NullBuffer>,
) -> Result<ArrayRef> {
    Ok(Arc::new(PrimitiveArray::<T>::try_new(
        ScalarBuffer::from(values.to_vec()),
        nulls,
    )?))
}

fn validity_of(array: &dyn Array) -> Option<ValidityMask> {
    let nulls = array.nulls()?;
    if nulls.null_count() == 0 {
        return None;
    }
    let flags: Vec<bool> = (0..array.len()).map(|i| nulls.is_valid(i)).collect();
    Some(ValidityMask::from_flags(&flags))
}

impl Vector {
    /// Copies an Arrow array into a new vector, preserving nulls.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::UnsupportedType`] for Arrow types without a
    /// logical counterpart.
    pub fn from_arrow(array: &dyn Array) -> Result<Self> {
        let logical_type = LogicalType::from_arrow(array.data_type())?;
        let capacity = array.len();
        let data = match logical_type.id() {
            LogicalTypeId::Boolean => {
                let arr = downcast::<BooleanArray>(array, &logical_type)?;
                VectorData::Boolean((0..capacity).map(|i| arr.value(i)).collect())
            }
            LogicalTypeId::UTinyInt => {
                VectorData::UTinyInt(primitive_values::<UInt8Type>(array, &logical_type)?)
            }
            LogicalTypeId::USmallInt => {
                VectorData::USmallInt(primitive_values::<UInt16Type>(array, &logical_type)?)
            }
            LogicalTypeId::Integer => {
                VectorData::Integer(primitive_values::<Int32Type>(array, &logical_type)?)
            }
            LogicalTypeId::BigInt => {
                VectorData::BigInt(primitive_values::<Int64Type>(array, &logical_type)?)
            }
            LogicalTypeId::Double => {
                VectorData::Double(primitive_values::<Float64Type>(array, &logical_type)?)
            }
            LogicalTypeId::Hugeint => {
                let arr = downcast::<Decimal128Array>(array, &logical_type)?;
                VectorData::Hugeint(arr.values().iter().map(|v| Hugeint::from(*v)).collect())
            }
            LogicalTypeId::Varchar => {
                let arr = downcast::<StringArray>(array, &logical_type)?;
                let mut strings = StringVector::with_capacity(capacity);
                for row in 0..capacity {
                    if arr.is_valid(row) {
                        strings.assign(row, arr.value(row).as_bytes());
                    }
                }
                VectorData::Varchar(strings)
            }
            LogicalTypeId::Struct => {
                let arr = downcast::<StructArray>(array, &logical_type)?;
                let children = arr
                    .columns()
                    .iter()
                    .map(|column| Vector::from_arrow(column.as_ref()))
                    .collect::<Result<Vec<_>>>()?;
                VectorData::Struct(children)
            }
            LogicalTypeId::List => {
                let arr = downcast::<ListArray>(array, &logical_type)?;
                let offsets = arr.value_offsets();
                let entries = offsets
                    .windows(2)
                    .map(|w| ListEntry {
                        offset: w[0] as usize,
                        length: (w[1] - w[0]) as usize,
                    })
                    .collect();
                VectorData::List {
                    entries,
                    child: Box::new(Vector::from_arrow(arr.values().as_ref())?),
                }
            }
        };
        Ok(Vector {
            logical_type,
            capacity,
            data,
            validity: validity_of(array),
            row_errors: Vec::new(),
        })
    }

    /// Copies the first `count` rows into a new Arrow array.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::RowCountOutOfBounds`] if `count` exceeds the
    /// capacity, or an Arrow error if the arrays cannot be assembled.
    pub fn to_arrow(&self, count: usize) -> Result<ArrayRef> {
        self.check_count(count)?;
        let nulls = self
            .validity
            .as_ref()
            .map(|mask| NullBuffer::from((0..count).map(|r| mask.is_valid(r)).collect::<Vec<_>>()));
        let array: ArrayRef = match &self.data {
            VectorData::Boolean(values) => Arc::new(BooleanArray::new(
                BooleanBuffer::from(&values[..count]),
                nulls,
            )),
            VectorData::UTinyInt(values) => primitive_array::<UInt8Type>(&values[..count], nulls)?,
            VectorData::USmallInt(values) => {
                primitive_array::<UInt16Type>(&values[..count], nulls)?
            }
            VectorData::Integer(values) => primitive_array::<Int32Type>(&values[..count], nulls)?,
            VectorData::BigInt(values) => primitive_array::<Int64Type>(&values[..count], nulls)?,
            VectorData::Double(values) => {
                primitive_array::<Float64Type>(&values[..count], nulls)?
            }
            VectorData::Hugeint(values) => {
                let raw: Vec<i128> = values[..count].iter().map(|v| v.as_i128()).collect();
                let decimals = Decimal128Array::try_new(ScalarBuffer::from(raw), nulls)?
                    .with_precision_and_scale(HUGEINT_DECIMAL_PRECISION, 0)?;
                // Decimal128(38, 0) holds |v| < 10^38, narrower than HUGEINT.
                decimals.validate_decimal_precision(HUGEINT_DECIMAL_PRECISION)?;
                Arc::new(decimals)
            }
            VectorData::Varchar(strings) => {
                let rows = (0..count)
                    .map(|row| {
                        if !self.is_valid(row) {
                            return Ok(None);
                        }
                        strings
                            .get(row)
                            .to_str()
                            .map(Some)
                            .map_err(|e| ArrowError::InvalidArgumentError(e.to_string()))
                    })
                    .collect::<std::result::Result<Vec<_>, ArrowError>>()?;
                Arc::new(StringArray::from(rows))
            }
            VectorData::Struct(children) => {
                let fields: Fields = self
                    .logical_type
                    .struct_fields()
                    .iter()
                    .map(|(name, ty)| Field::new(name, ty.to_arrow(), true))
                    .collect::<Vec<_>>()
                    .into();
                let arrays = children
                    .iter()
                    .map(|child| child.to_arrow(count))
                    .collect::<Result<Vec<_>>>()?;
                Arc::new(StructArray::try_new(fields, arrays, nulls)?)
            }
            VectorData::List { entries, child } => {
                let mut offsets = Vec::with_capacity(count + 1);
                let mut indices: Vec<u32> = Vec::new();
                offsets.push(0_i32);
                for (row, entry) in entries[..count].iter().enumerate() {
                    if self.is_valid(row) {
                        indices.extend((entry.offset..entry.offset + entry.length).map(|i| i as u32));
                    }
                    offsets.push(indices.len() as i32);
                }
                let child_array = child.to_arrow(child.capacity)?;
                let values =
                    arrow::compute::take(child_array.as_ref(), &UInt32Array::from(indices), None)?;
                let field = Arc::new(Field::new("item", child.logical_type.to_arrow(), true));
                Arc::new(ListArray::try_new(
                    field,
                    OffsetBuffer::new(ScalarBuffer::from(offsets)),
                    values,
                    nulls,
                )?)
            }
        };
        Ok(array)
    }
}

impl DataChunk {
    /// Copies every column of a record batch into a chunk.
    ///
    /// # Errors
    ///
    /// Returns an error if a column type has no logical counterpart.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        Self::from_arrays(batch.columns(), batch.num_rows())
    }

    /// Copies equally sized Arrow arrays into a chunk of `size` rows.
    ///
    /// # Errors
    ///
    /// Returns an error if a column type has no logical counterpart or holds
    /// fewer than `size` rows.
    pub fn from_arrays(arrays: &[ArrayRef], size: usize) -> Result<Self> {
        let vectors = arrays
            .iter()
            .map(|array| Vector::from_arrow(array.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        DataChunk::new(vectors, size)
    }
}
