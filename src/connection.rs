//! The seam to the external connection collaborator.
//!
//! oradialect never talks to a database itself. Everything that leaves the
//! process goes through a [`Connection`]: SQL text in, rows of [`Value`]s
//! out. Errors come back as [`ExecutionError`] carrying the engine's SQLCODE
//! so callers can tell a missing object apart from everything else.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::descriptor::ConnectionDescriptor;

/// SQLCODE for ORA-00942 "table or view does not exist".
pub const TABLE_OR_VIEW_DOES_NOT_EXIST: i32 = -942;

/// A single catalog row, positional.
pub type Row = Vec<Value>;

/// Dynamic value type for catalog rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read an integer, accepting numeric text as drivers often hand back
    /// NUMBER columns as strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read a non-negative size.
    pub fn as_u32(&self) -> Option<u32> {
        self.as_i64().and_then(|v| u32::try_from(v).ok())
    }

    /// Render the value as text (NULL becomes `None`).
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Int(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Timestamp(ts) => Some(ts.to_string()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Error reported by the collaborator while executing a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExecutionError {
    /// Negative SQLCODE as reported by the engine, when known.
    pub code: Option<i32>,
    pub message: String,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// True for ORA-00942 only.
    pub fn is_missing_object(&self) -> bool {
        self.code == Some(TABLE_OR_VIEW_DOES_NOT_EXIST)
    }
}

/// A live, blocking connection owned by one unit of work.
pub trait Connection {
    /// Run a query and return every row in result order.
    fn fetch_all(&mut self, sql: &str) -> Result<Vec<Row>, ExecutionError>;

    /// Run a statement that returns no rows. Returns the affected row count.
    fn execute(&mut self, sql: &str) -> Result<u64, ExecutionError>;
}

impl<C: Connection + ?Sized> Connection for &mut C {
    fn fetch_all(&mut self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
        (**self).fetch_all(sql)
    }

    fn execute(&mut self, sql: &str) -> Result<u64, ExecutionError> {
        (**self).execute(sql)
    }
}

/// Opens connections from a descriptor (network, pooling and auth live here).
pub trait Connector {
    type Conn: Connection;

    fn open(&self, descriptor: &ConnectionDescriptor) -> Result<Self::Conn, ExecutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from("ID"), Value::Text("ID".into()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(7i64)), Value::Int(7));
    }

    #[test]
    fn test_value_numeric_accessors() {
        assert_eq!(Value::Text(" 22 ".into()).as_i64(), Some(22));
        assert_eq!(Value::Float(10.0).as_u32(), Some(10));
        assert_eq!(Value::Float(10.5).as_i64(), None);
        assert_eq!(Value::Int(-1).as_u32(), None);
        assert_eq!(Value::Null.as_i64(), None);
    }

    #[test]
    fn test_missing_object_code() {
        assert!(ExecutionError::with_code(-942, "gone").is_missing_object());
        assert!(!ExecutionError::with_code(-1031, "insufficient privileges").is_missing_object());
        assert!(!ExecutionError::new("network").is_missing_object());
    }
}
