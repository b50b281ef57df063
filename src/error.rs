//! Error types for oradialect.

use thiserror::Error;

use crate::connection::ExecutionError;
use crate::dialect::DdlOperation;

/// The main error type for dialect and introspection operations.
#[derive(Debug, Error)]
pub enum DialectError {
    /// The dialect has no SQL for this DDL operation.
    #[error("Unsupported capability: {0} is not implemented by this dialect")]
    Unsupported(DdlOperation),

    /// A definition handed to a builder is incomplete.
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    /// The abstract column type has no native counterpart.
    #[error("Unrecognized column type at column '{column}'")]
    UnrecognizedColumnType { column: String },

    /// Error reported by the connection collaborator, passed through untouched.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// A query succeeded but did not return the value it should have.
    #[error("Missing value: {0}")]
    MissingValue(String),

    /// Failed to parse a connection address.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML decoding error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DialectError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create an invalid definition error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidDefinition(message.into())
    }

    /// True when the dialect refused the operation as a capability gap.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// True when the collaborator reported that the object does not exist.
    pub fn is_missing_object(&self) -> bool {
        matches!(self, Self::Execution(e) if e.is_missing_object())
    }
}

/// Result type alias for oradialect operations.
pub type DialectResult<T> = Result<T, DialectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DialectError::parse(5, "expected port number");
        assert_eq!(err.to_string(), "Parse error at position 5: expected port number");

        let err = DialectError::Unsupported(DdlOperation::AddColumn);
        assert_eq!(
            err.to_string(),
            "Unsupported capability: ADD COLUMN is not implemented by this dialect"
        );
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_execution_error_is_transparent() {
        let err: DialectError = ExecutionError::with_code(-942, "ORA-00942: table or view does not exist").into();
        assert_eq!(err.to_string(), "ORA-00942: table or view does not exist");
        assert!(err.is_missing_object());
        assert!(!err.is_unsupported());
    }
}
