//! Host-side columnar vectors.
//!
//! A [`Vector`] is a column owned by the host: typed storage for up to
//! `capacity` rows, an optional validity mask, and, for STRUCT and LIST, child
//! vectors addressed by the same row index. The engine only ever borrows
//! vectors; it never creates the vectors it reads from or writes to.

mod arrow_bridge;
mod strings;
mod validity;

use std::fmt;

use crate::error::{Result, VexecError};
use crate::types::{Hugeint, LogicalType, LogicalTypeId, StringT};

pub use strings::{StringEntry, StringVector};
pub use validity::ValidityMask;

pub(crate) use validity::ensure_writable;

/// Offset and length of one LIST row inside the child vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListEntry {
    pub offset: usize,
    pub length: usize,
}

/// Typed storage of a vector.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorData {
    Boolean(Vec<bool>),
    UTinyInt(Vec<u8>),
    USmallInt(Vec<u16>),
    Integer(Vec<i32>),
    BigInt(Vec<i64>),
    Double(Vec<f64>),
    Hugeint(Vec<Hugeint>),
    Varchar(StringVector),
    /// One child vector per declared field, in order.
    Struct(Vec<Vector>),
    List {
        entries: Vec<ListEntry>,
        child: Box<Vector>,
    },
}

/// Error annotation a best-effort invocation left on one output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowErrorAnnotation {
    pub row: usize,
    pub message: String,
}

impl fmt::Display for RowErrorAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}

/// Fixed-width values stored directly in a vector's data slots.
pub trait PhysicalType: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Logical type whose storage holds `Self`.
    fn logical_type() -> LogicalType;
    /// Borrows the typed slots, if `data` stores `Self`.
    fn values(data: &VectorData) -> Option<&[Self]>;
    /// Mutably borrows the typed slots, if `data` stores `Self`.
    fn values_mut(data: &mut VectorData) -> Option<&mut [Self]>;
    /// Wraps owned values as vector storage.
    fn into_data(values: Vec<Self>) -> VectorData;
}

macro_rules! impl_physical_type {
    ($ty:ty, $variant:ident, $ctor:ident) => {
        impl PhysicalType for $ty {
            fn logical_type() -> LogicalType {
                LogicalType::$ctor()
            }

            #[inline]
            fn values(data: &VectorData) -> Option<&[Self]> {
                match data {
                    VectorData::$variant(values) => Some(values),
                    _ => None,
                }
            }

            #[inline]
            fn values_mut(data: &mut VectorData) -> Option<&mut [Self]> {
                match data {
                    VectorData::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn into_data(values: Vec<Self>) -> VectorData {
                VectorData::$variant(values)
            }
        }
    };
}

impl_physical_type!(bool, Boolean, boolean);
impl_physical_type!(u8, UTinyInt, utinyint);
impl_physical_type!(u16, USmallInt, usmallint);
impl_physical_type!(i32, Integer, integer);
impl_physical_type!(i64, BigInt, bigint);
impl_physical_type!(f64, Double, double);
impl_physical_type!(Hugeint, Hugeint, hugeint);

/// A host-owned column.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    logical_type: LogicalType,
    capacity: usize,
    data: VectorData,
    validity: Option<ValidityMask>,
    row_errors: Vec<RowErrorAnnotation>,
}

impl Vector {
    /// Allocates an all-valid vector of `capacity` default values.
    ///
    /// STRUCT children are allocated recursively with the same capacity; a
    /// LIST starts with an empty child.
    #[must_use]
    pub fn new(logical_type: LogicalType, capacity: usize) -> Self {
        let data = match logical_type.id() {
            LogicalTypeId::Boolean => VectorData::Boolean(vec![false; capacity]),
            LogicalTypeId::UTinyInt => VectorData::UTinyInt(vec![0; capacity]),
            LogicalTypeId::USmallInt => VectorData::USmallInt(vec![0; capacity]),
            LogicalTypeId::Integer => VectorData::Integer(vec![0; capacity]),
            LogicalTypeId::BigInt => VectorData::BigInt(vec![0; capacity]),
            LogicalTypeId::Double => VectorData::Double(vec![0.0; capacity]),
            LogicalTypeId::Hugeint => VectorData::Hugeint(vec![Hugeint::default(); capacity]),
            LogicalTypeId::Varchar => VectorData::Varchar(StringVector::with_capacity(capacity)),
            LogicalTypeId::Struct => VectorData::Struct(
                logical_type
                    .struct_fields()
                    .iter()
                    .map(|(_, ty)| Vector::new(ty.clone(), capacity))
                    .collect(),
            ),
            LogicalTypeId::List => {
                let child_type = logical_type
                    .child_at(0)
                    .cloned()
                    .unwrap_or_else(|_| LogicalType::integer());
                VectorData::List {
                    entries: vec![ListEntry::default(); capacity],
                    child: Box::new(Vector::new(child_type, 0)),
                }
            }
        };
        Vector {
            logical_type,
            capacity,
            data,
            validity: None,
            row_errors: Vec::new(),
        }
    }

    /// Builds a fixed-width vector; `None` entries become null rows.
    #[must_use]
    pub fn from_values<T: PhysicalType>(values: &[Option<T>]) -> Self {
        let data = values.iter().map(|v| v.unwrap_or_default()).collect();
        Vector {
            logical_type: T::logical_type(),
            capacity: values.len(),
            data: T::into_data(data),
            validity: mask_from_options(values),
            row_errors: Vec::new(),
        }
    }

    /// Builds a VARCHAR vector; `None` entries become null rows.
    #[must_use]
    pub fn from_strings(values: &[Option<&str>]) -> Self {
        let mut strings = StringVector::with_capacity(values.len());
        for (row, value) in values.iter().enumerate() {
            if let Some(value) = value {
                strings.assign(row, value.as_bytes());
            }
        }
        Vector {
            logical_type: LogicalType::varchar(),
            capacity: values.len(),
            data: VectorData::Varchar(strings),
            validity: mask_from_options(values),
            row_errors: Vec::new(),
        }
    }

    /// Builds a STRUCT vector from named children of equal capacity.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::RowCountOutOfBounds`] if the children or the
    /// validity flags disagree on the row count.
    pub fn from_struct(fields: Vec<(String, Vector)>, validity: Option<&[bool]>) -> Result<Self> {
        let capacity = fields
            .first()
            .map(|(_, v)| v.capacity)
            .or(validity.map(<[bool]>::len))
            .unwrap_or(0);
        for (_, child) in &fields {
            if child.capacity != capacity {
                return Err(VexecError::RowCountOutOfBounds {
                    count: capacity,
                    capacity: child.capacity,
                });
            }
        }
        if let Some(flags) = validity {
            if flags.len() != capacity {
                return Err(VexecError::RowCountOutOfBounds {
                    count: flags.len(),
                    capacity,
                });
            }
        }
        let logical_type = LogicalType::structure(
            fields
                .iter()
                .map(|(name, v)| (name.clone(), v.logical_type.clone()))
                .collect(),
        );
        Ok(Vector {
            logical_type,
            capacity,
            data: VectorData::Struct(fields.into_iter().map(|(_, v)| v).collect()),
            validity: validity.map(ValidityMask::from_flags),
            row_errors: Vec::new(),
        })
    }

    /// Builds a LIST vector over `child`.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::RowCountOutOfBounds`] if an entry reaches past
    /// the child's capacity or the mask does not cover exactly one bit per
    /// entry.
    pub fn from_list(
        entries: Vec<ListEntry>,
        child: Vector,
        validity: Option<ValidityMask>,
    ) -> Result<Self> {
        if let Some(mask) = &validity {
            if mask.len() != entries.len() {
                return Err(VexecError::RowCountOutOfBounds {
                    count: mask.len(),
                    capacity: entries.len(),
                });
            }
        }
        for entry in &entries {
            let end = entry.offset + entry.length;
            if end > child.capacity {
                return Err(VexecError::RowCountOutOfBounds {
                    count: end,
                    capacity: child.capacity,
                });
            }
        }
        Ok(Vector {
            logical_type: LogicalType::list(child.logical_type.clone()),
            capacity: entries.len(),
            data: VectorData::List {
                entries,
                child: Box::new(child),
            },
            validity,
            row_errors: Vec::new(),
        })
    }

    #[must_use]
    pub fn logical_type(&self) -> &LogicalType {
        &self.logical_type
    }

    /// Number of row slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn data(&self) -> &VectorData {
        &self.data
    }

    /// Typed fixed-width slots.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::TypeMismatch`] if the vector does not store `T`.
    pub fn values<T: PhysicalType>(&self) -> Result<&[T]> {
        T::values(&self.data).ok_or_else(|| self.mismatch(&T::logical_type()))
    }

    /// Mutable typed fixed-width slots.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::TypeMismatch`] if the vector does not store `T`.
    pub fn values_mut<T: PhysicalType>(&mut self) -> Result<&mut [T]> {
        match T::values_mut(&mut self.data) {
            Some(values) => Ok(values),
            None => Err(VexecError::TypeMismatch {
                expected: T::logical_type().to_string(),
                actual: self.logical_type.to_string(),
            }),
        }
    }

    /// VARCHAR storage.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::TypeMismatch`] for non-VARCHAR vectors.
    pub fn strings(&self) -> Result<&StringVector> {
        match &self.data {
            VectorData::Varchar(strings) => Ok(strings),
            _ => Err(self.mismatch(&LogicalType::varchar())),
        }
    }

    /// Returns the string at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::TypeMismatch`] for non-VARCHAR vectors and
    /// [`VexecError::RowCountOutOfBounds`] past the capacity.
    pub fn string_at(&self, row: usize) -> Result<StringT<'_>> {
        let strings = self.strings()?;
        if row >= self.capacity {
            return Err(VexecError::RowCountOutOfBounds {
                count: row + 1,
                capacity: self.capacity,
            });
        }
        Ok(strings.get(row))
    }

    /// Copies a string into row `row`.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::TypeMismatch`] for non-VARCHAR vectors.
    pub fn assign_string(&mut self, row: usize, value: &str) -> Result<()> {
        match &mut self.data {
            VectorData::Varchar(strings) => {
                strings.assign(row, value.as_bytes());
                Ok(())
            }
            _ => Err(self.mismatch(&LogicalType::varchar())),
        }
    }

    /// The validity mask; `None` means every row is valid.
    #[must_use]
    pub fn validity(&self) -> Option<&ValidityMask> {
        self.validity.as_ref()
    }

    /// Returns the validity mask, creating an all-valid one if absent.
    pub fn ensure_validity_writable(&mut self) -> &mut ValidityMask {
        ensure_writable(&mut self.validity, self.capacity)
    }

    /// Returns whether `row` holds a value.
    #[must_use]
    pub fn is_valid(&self, row: usize) -> bool {
        row < self.capacity && self.validity.as_ref().map_or(true, |v| v.is_valid(row))
    }

    /// Marks `row` null at this level only.
    pub fn set_null(&mut self, row: usize) {
        self.ensure_validity_writable().set_invalid(row);
    }

    /// Returns the child vector at `index`.
    ///
    /// # Errors
    ///
    /// STRUCT accepts any declared field index, LIST only index 0; any other
    /// request is a contract violation.
    pub fn child(&self, index: usize) -> Result<&Vector> {
        match &self.data {
            VectorData::Struct(children) => {
                children
                    .get(index)
                    .ok_or(VexecError::ChildIndexOutOfRange {
                        index,
                        count: children.len(),
                    })
            }
            VectorData::List { child, .. } if index == 0 => Ok(child),
            VectorData::List { .. } => Err(VexecError::ChildIndexOutOfRange { index, count: 1 }),
            _ => Err(VexecError::NotNested(self.logical_type.to_string())),
        }
    }

    /// Mutable counterpart of [`Vector::child`].
    ///
    /// # Errors
    ///
    /// Same contract as [`Vector::child`].
    pub fn child_mut(&mut self, index: usize) -> Result<&mut Vector> {
        match &mut self.data {
            VectorData::Struct(children) => {
                let count = children.len();
                children
                    .get_mut(index)
                    .ok_or(VexecError::ChildIndexOutOfRange { index, count })
            }
            VectorData::List { child, .. } if index == 0 => Ok(child),
            VectorData::List { .. } => Err(VexecError::ChildIndexOutOfRange { index, count: 1 }),
            _ => Err(VexecError::NotNested(self.logical_type.to_string())),
        }
    }

    /// STRUCT children in declared order.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::TypeMismatch`] for non-STRUCT vectors.
    pub fn struct_children(&self) -> Result<&[Vector]> {
        match &self.data {
            VectorData::Struct(children) => Ok(children),
            _ => Err(VexecError::TypeMismatch {
                expected: LogicalTypeId::Struct.name().to_string(),
                actual: self.logical_type.to_string(),
            }),
        }
    }

    /// LIST entries.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::TypeMismatch`] for non-LIST vectors.
    pub fn list_entries(&self) -> Result<&[ListEntry]> {
        match &self.data {
            VectorData::List { entries, .. } => Ok(entries),
            _ => Err(VexecError::TypeMismatch {
                expected: LogicalTypeId::List.name().to_string(),
                actual: self.logical_type.to_string(),
            }),
        }
    }

    /// Error annotations recorded on this vector, in recording order.
    #[must_use]
    pub fn row_errors(&self) -> &[RowErrorAnnotation] {
        &self.row_errors
    }

    /// Records an error annotation for `row`.
    ///
    /// The row's null state is left to the caller.
    pub fn record_row_error(&mut self, row: usize, message: impl Into<String>) {
        self.row_errors.push(RowErrorAnnotation {
            row,
            message: message.into(),
        });
    }

    /// Drops all error annotations.
    pub fn clear_row_errors(&mut self) {
        self.row_errors.clear();
    }

    /// Splits the vector into independently borrowable parts for writers.
    pub(crate) fn parts_mut(&mut self) -> VectorPartsMut<'_> {
        VectorPartsMut {
            logical_type: &self.logical_type,
            data: &mut self.data,
            validity: &mut self.validity,
            capacity: self.capacity,
        }
    }

    /// Checks that `count` rows fit into this vector.
    pub(crate) fn check_count(&self, count: usize) -> Result<()> {
        if count > self.capacity {
            return Err(VexecError::RowCountOutOfBounds {
                count,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    pub(crate) fn mismatch(&self, expected: &LogicalType) -> VexecError {
        VexecError::TypeMismatch {
            expected: expected.to_string(),
            actual: self.logical_type.to_string(),
        }
    }
}

/// Disjoint borrows of a vector's fields.
pub(crate) struct VectorPartsMut<'v> {
    pub logical_type: &'v LogicalType,
    pub data: &'v mut VectorData,
    pub validity: &'v mut Option<ValidityMask>,
    pub capacity: usize,
}

fn mask_from_options<T>(values: &[Option<T>]) -> Option<ValidityMask> {
    if values.iter().all(Option::is_some) {
        return None;
    }
    let flags: Vec<bool> = values.iter().map(Option::is_some).collect();
    Some(ValidityMask::from_flags(&flags))
}

/// The input columns of one invocation plus its row count.
#[derive(Debug, Clone)]
pub struct DataChunk {
    vectors: Vec<Vector>,
    size: usize,
}

impl DataChunk {
    /// Creates a chunk of `size` rows.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::RowCountOutOfBounds`] if a vector holds fewer
    /// than `size` rows.
    pub fn new(vectors: Vec<Vector>, size: usize) -> Result<Self> {
        for vector in &vectors {
            vector.check_count(size)?;
        }
        Ok(DataChunk { vectors, size })
    }

    /// Number of rows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.vectors.len()
    }

    /// Returns the column at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::ArgumentCountMismatch`] past the last column.
    pub fn vector(&self, index: usize) -> Result<&Vector> {
        self.vectors
            .get(index)
            .ok_or(VexecError::ArgumentCountMismatch {
                expected: index + 1,
                actual: self.vectors.len(),
            })
    }

    #[must_use]
    pub fn vectors(&self) -> &[Vector] {
        &self.vectors
    }
}
