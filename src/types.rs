//! Abstract, engine-neutral schema descriptors.
//!
//! These are built fresh for every introspection call and never persisted.

use std::fmt;

use serde::Serialize;

/// Abstract column types.
///
/// Only some of these have an Oracle counterpart; the rest exist because
/// other dialects produce them and must be rejected cleanly when generating
/// Oracle DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Decimal,
    Varchar,
    Float,
    Timestamp,
    Datetime,
    Date,
    Char,
    Text,
    Boolean,
    BigInteger,
    Double,
    Blob,
    Json,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Decimal => "decimal",
            ColumnType::Varchar => "varchar",
            ColumnType::Float => "float",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Datetime => "datetime",
            ColumnType::Date => "date",
            ColumnType::Char => "char",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::BigInteger => "biginteger",
            ColumnType::Double => "double",
            ColumnType::Blob => "blob",
            ColumnType::Json => "json",
        };
        f.write_str(name)
    }
}

/// How a value of this column should be bound in a parameterized statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindType {
    Null,
    Int,
    #[default]
    Str,
    Blob,
    Bool,
    Decimal,
}

impl BindType {
    /// Numeric code used by PDO-style drivers.
    pub fn code(self) -> u8 {
        match self {
            BindType::Null => 0,
            BindType::Int => 1,
            BindType::Str => 2,
            BindType::Blob => 3,
            BindType::Bool => 5,
            BindType::Decimal => 32,
        }
    }
}

/// The type-related part of a column, as produced by type classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub size: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub is_numeric: bool,
    pub bind_type: BindType,
}

impl ColumnDefinition {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            size: None,
            precision: None,
            scale: None,
            is_numeric: false,
            bind_type: BindType::Str,
        }
    }

    pub fn size(mut self, size: Option<u32>) -> Self {
        self.size = size;
        self
    }

    pub fn scale(mut self, scale: Option<u32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn precision(mut self, precision: Option<u32>) -> Self {
        self.precision = precision;
        self
    }

    pub fn numeric(mut self, bind_type: BindType) -> Self {
        self.is_numeric = true;
        self.bind_type = bind_type;
        self
    }
}

/// Where a column sits in the table's declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnPosition {
    First,
    After(String),
}

/// A fully described table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub size: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub is_numeric: bool,
    pub bind_type: BindType,
    pub not_null: bool,
    pub primary: bool,
    pub default: Option<String>,
    pub position: ColumnPosition,
}

impl Column {
    pub fn new(name: impl Into<String>, definition: ColumnDefinition, position: ColumnPosition) -> Self {
        Self {
            name: name.into(),
            column_type: definition.column_type,
            size: definition.size,
            precision: definition.precision,
            scale: definition.scale,
            is_numeric: definition.is_numeric,
            bind_type: definition.bind_type,
            not_null: false,
            primary: false,
            default: None,
            position,
        }
    }

    /// A column placed first, for DDL callers that only care about the type.
    pub fn of_type(name: impl Into<String>, definition: ColumnDefinition) -> Self {
        Self::new(name, definition, ColumnPosition::First)
    }

    pub fn is_first(&self) -> bool {
        self.position == ColumnPosition::First
    }

    /// Name of the preceding column, if this is not the first one.
    pub fn after(&self) -> Option<&str> {
        match &self.position {
            ColumnPosition::First => None,
            ColumnPosition::After(name) => Some(name),
        }
    }
}

/// A table name with an optional owning schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableRef {
    pub name: String,
    pub schema: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }

    pub fn in_schema(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema.into()),
        }
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// An index and its columns in key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Index {
    pub table: String,
    /// Owning schema, when the catalog reports one.
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<String>,
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub table: String,
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_schema: Option<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

/// SQL text inserted verbatim, never escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawValue(pub String);

impl RawValue {
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
