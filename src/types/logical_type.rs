//! Logical type descriptors exchanged with the host.

use std::fmt;
use std::sync::Arc;

use arrow::datatypes::{DataType as ArrowDataType, Field, Fields};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VexecError};

/// Precision used for HUGEINT when it crosses the Arrow boundary.
pub const HUGEINT_DECIMAL_PRECISION: u8 = 38;

/// Kind tag of a logical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalTypeId {
    /// Boolean.
    Boolean,
    /// Unsigned 8-bit integer.
    UTinyInt,
    /// Unsigned 16-bit integer.
    USmallInt,
    /// Signed 32-bit integer.
    Integer,
    /// Signed 64-bit integer.
    BigInt,
    /// 64-bit floating point.
    Double,
    /// Signed 128-bit integer.
    Hugeint,
    /// UTF-8 text.
    Varchar,
    /// Ordered, named fields.
    Struct,
    /// Variable-length list of a single child type.
    List,
}

impl LogicalTypeId {
    /// Returns the SQL name of the type id.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LogicalTypeId::Boolean => "BOOLEAN",
            LogicalTypeId::UTinyInt => "UTINYINT",
            LogicalTypeId::USmallInt => "USMALLINT",
            LogicalTypeId::Integer => "INTEGER",
            LogicalTypeId::BigInt => "BIGINT",
            LogicalTypeId::Double => "DOUBLE",
            LogicalTypeId::Hugeint => "HUGEINT",
            LogicalTypeId::Varchar => "VARCHAR",
            LogicalTypeId::Struct => "STRUCT",
            LogicalTypeId::List => "LIST",
        }
    }

    /// Returns whether values of this kind live in child vectors.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        matches!(self, LogicalTypeId::Struct | LogicalTypeId::List)
    }
}

impl fmt::Display for LogicalTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of a logical type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum TypeInfo {
    Scalar(LogicalTypeId),
    Struct(Vec<(String, LogicalType)>),
    List(Box<LogicalType>),
}

/// A logical type: a kind tag plus, for nested kinds, the child types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalType {
    info: TypeInfo,
    alias: Option<String>,
}

impl LogicalType {
    fn scalar(id: LogicalTypeId) -> Self {
        LogicalType {
            info: TypeInfo::Scalar(id),
            alias: None,
        }
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::scalar(LogicalTypeId::Boolean)
    }

    #[must_use]
    pub fn utinyint() -> Self {
        Self::scalar(LogicalTypeId::UTinyInt)
    }

    #[must_use]
    pub fn usmallint() -> Self {
        Self::scalar(LogicalTypeId::USmallInt)
    }

    #[must_use]
    pub fn integer() -> Self {
        Self::scalar(LogicalTypeId::Integer)
    }

    #[must_use]
    pub fn bigint() -> Self {
        Self::scalar(LogicalTypeId::BigInt)
    }

    #[must_use]
    pub fn double() -> Self {
        Self::scalar(LogicalTypeId::Double)
    }

    #[must_use]
    pub fn hugeint() -> Self {
        Self::scalar(LogicalTypeId::Hugeint)
    }

    #[must_use]
    pub fn varchar() -> Self {
        Self::scalar(LogicalTypeId::Varchar)
    }

    /// Creates a STRUCT type from ordered `(name, type)` fields.
    #[must_use]
    pub fn structure(fields: Vec<(String, LogicalType)>) -> Self {
        LogicalType {
            info: TypeInfo::Struct(fields),
            alias: None,
        }
    }

    /// Creates a LIST type of the given child type.
    #[must_use]
    pub fn list(child: LogicalType) -> Self {
        LogicalType {
            info: TypeInfo::List(Box::new(child)),
            alias: None,
        }
    }

    /// Attaches a display alias to this type.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Returns the alias, if one was set.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns the kind of this type.
    #[must_use]
    pub fn id(&self) -> LogicalTypeId {
        match &self.info {
            TypeInfo::Scalar(id) => *id,
            TypeInfo::Struct(_) => LogicalTypeId::Struct,
            TypeInfo::List(_) => LogicalTypeId::List,
        }
    }

    /// Returns whether this type has child types.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.id().is_nested()
    }

    /// Returns the number of child types (0 for scalars, 1 for LIST).
    #[must_use]
    pub fn child_count(&self) -> usize {
        match &self.info {
            TypeInfo::Scalar(_) => 0,
            TypeInfo::Struct(fields) => fields.len(),
            TypeInfo::List(_) => 1,
        }
    }

    /// Returns the child type at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::NotNested`] for scalar types and
    /// [`VexecError::ChildIndexOutOfRange`] past the last child.
    pub fn child_at(&self, index: usize) -> Result<&LogicalType> {
        match &self.info {
            TypeInfo::Scalar(id) => Err(VexecError::NotNested(id.name().to_string())),
            TypeInfo::Struct(fields) => {
                fields
                    .get(index)
                    .map(|(_, ty)| ty)
                    .ok_or(VexecError::ChildIndexOutOfRange {
                        index,
                        count: fields.len(),
                    })
            }
            TypeInfo::List(child) if index == 0 => Ok(child),
            TypeInfo::List(_) => Err(VexecError::ChildIndexOutOfRange { index, count: 1 }),
        }
    }

    /// Returns the field name of a STRUCT child.
    ///
    /// # Errors
    ///
    /// Returns an error if this is not a STRUCT or the index is out of range.
    pub fn struct_child_name(&self, index: usize) -> Result<&str> {
        match &self.info {
            TypeInfo::Struct(fields) => fields
                .get(index)
                .map(|(name, _)| name.as_str())
                .ok_or(VexecError::ChildIndexOutOfRange {
                    index,
                    count: fields.len(),
                }),
            _ => Err(VexecError::NotNested(self.to_string())),
        }
    }

    /// Returns the fields of a STRUCT type, or an empty slice.
    #[must_use]
    pub fn struct_fields(&self) -> &[(String, LogicalType)] {
        match &self.info {
            TypeInfo::Struct(fields) => fields,
            _ => &[],
        }
    }

    /// Returns whether two types share the same physical layout, ignoring
    /// aliases and struct field names.
    #[must_use]
    pub fn same_layout(&self, other: &LogicalType) -> bool {
        match (&self.info, &other.info) {
            (TypeInfo::Scalar(a), TypeInfo::Scalar(b)) => a == b,
            (TypeInfo::Struct(a), TypeInfo::Struct(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((_, x), (_, y))| x.same_layout(y))
            }
            (TypeInfo::List(a), TypeInfo::List(b)) => a.same_layout(b),
            _ => false,
        }
    }

    /// Converts to an Arrow data type.
    #[must_use]
    pub fn to_arrow(&self) -> ArrowDataType {
        match &self.info {
            TypeInfo::Scalar(id) => match id {
                LogicalTypeId::Boolean => ArrowDataType::Boolean,
                LogicalTypeId::UTinyInt => ArrowDataType::UInt8,
                LogicalTypeId::USmallInt => ArrowDataType::UInt16,
                LogicalTypeId::Integer => ArrowDataType::Int32,
                LogicalTypeId::BigInt => ArrowDataType::Int64,
                LogicalTypeId::Double => ArrowDataType::Float64,
                LogicalTypeId::Hugeint => {
                    ArrowDataType::Decimal128(HUGEINT_DECIMAL_PRECISION, 0)
                }
                LogicalTypeId::Varchar => ArrowDataType::Utf8,
                // Nested ids never appear as scalars.
                LogicalTypeId::Struct => ArrowDataType::Struct(Fields::empty()),
                LogicalTypeId::List => {
                    ArrowDataType::List(Arc::new(Field::new("item", ArrowDataType::Null, true)))
                }
            },
            TypeInfo::Struct(fields) => ArrowDataType::Struct(
                fields
                    .iter()
                    .map(|(name, ty)| Field::new(name, ty.to_arrow(), true))
                    .collect::<Vec<_>>()
                    .into(),
            ),
            TypeInfo::List(child) => {
                ArrowDataType::List(Arc::new(Field::new("item", child.to_arrow(), true)))
            }
        }
    }

    /// Converts from an Arrow data type.
    ///
    /// # Errors
    ///
    /// Returns [`VexecError::UnsupportedType`] for Arrow types without a
    /// logical counterpart.
    pub fn from_arrow(arrow_type: &ArrowDataType) -> Result<Self> {
        match arrow_type {
            ArrowDataType::Boolean => Ok(Self::boolean()),
            ArrowDataType::UInt8 => Ok(Self::utinyint()),
            ArrowDataType::UInt16 => Ok(Self::usmallint()),
            ArrowDataType::Int32 => Ok(Self::integer()),
            ArrowDataType::Int64 => Ok(Self::bigint()),
            ArrowDataType::Float64 => Ok(Self::double()),
            ArrowDataType::Decimal128(_, 0) => Ok(Self::hugeint()),
            ArrowDataType::Utf8 => Ok(Self::varchar()),
            ArrowDataType::Struct(fields) => {
                let children = fields
                    .iter()
                    .map(|f| Ok((f.name().clone(), Self::from_arrow(f.data_type())?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::structure(children))
            }
            ArrowDataType::List(field) => Ok(Self::list(Self::from_arrow(field.data_type())?)),
            other => Err(VexecError::UnsupportedType(format!("{other:?}"))),
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alias) = &self.alias {
            return f.write_str(alias);
        }
        match &self.info {
            TypeInfo::Scalar(id) => f.write_str(id.name()),
            TypeInfo::Struct(fields) => {
                f.write_str("STRUCT(")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name} {ty}")?;
                }
                f.write_str(")")
            }
            TypeInfo::List(child) => write!(f, "{child}[]"),
        }
    }
}
