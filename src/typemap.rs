//! Type mapping between Oracle native type names and abstract column types.
//!
//! Classification is substring containment over an ordered rule list, first
//! match wins. `NUMBER(1) CHAR` style names therefore resolve to the earliest
//! rule they contain. The `INTEGER` rule stays in place even though the
//! catalog reports integer columns as `NUMBER`.

use crate::error::{DialectError, DialectResult};
use crate::types::{BindType, Column, ColumnDefinition, ColumnType};

/// Size information as reported by `ALL_TAB_COLUMNS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSize {
    /// `DATA_LENGTH`
    pub length: Option<u32>,
    /// `DATA_PRECISION`
    pub precision: Option<u32>,
    /// `DATA_SCALE`
    pub scale: Option<u32>,
}

impl CatalogSize {
    pub fn new(length: Option<u32>, precision: Option<u32>, scale: Option<u32>) -> Self {
        Self {
            length,
            precision,
            scale,
        }
    }
}

type Mapping = fn(CatalogSize) -> ColumnDefinition;

/// Most specific first.
const RULES: &[(&str, Mapping)] = &[
    ("NUMBER", decimal),
    ("INTEGER", integer),
    ("VARCHAR2", varchar),
    ("FLOAT", float),
    ("TIMESTAMP", timestamp),
    ("DATE", date),
    ("RAW", text),
    ("BLOB", text),
    ("CLOB", text),
    ("CHAR", fixed_char),
];

fn decimal(s: CatalogSize) -> ColumnDefinition {
    ColumnDefinition::new(ColumnType::Decimal)
        .numeric(BindType::Decimal)
        .size(s.precision)
        .precision(s.precision)
        .scale(s.scale)
}

fn integer(s: CatalogSize) -> ColumnDefinition {
    ColumnDefinition::new(ColumnType::Integer)
        .numeric(BindType::Int)
        .size(s.precision)
        .precision(s.precision)
}

fn varchar(s: CatalogSize) -> ColumnDefinition {
    ColumnDefinition::new(ColumnType::Varchar).size(s.length)
}

fn float(s: CatalogSize) -> ColumnDefinition {
    ColumnDefinition::new(ColumnType::Float)
        .numeric(BindType::Decimal)
        .size(s.length)
        .precision(s.precision)
        .scale(s.scale)
}

fn timestamp(_: CatalogSize) -> ColumnDefinition {
    ColumnDefinition::new(ColumnType::Timestamp)
}

fn date(_: CatalogSize) -> ColumnDefinition {
    ColumnDefinition::new(ColumnType::Date)
}

fn text(_: CatalogSize) -> ColumnDefinition {
    ColumnDefinition::new(ColumnType::Text)
}

fn fixed_char(s: CatalogSize) -> ColumnDefinition {
    ColumnDefinition::new(ColumnType::Char).size(s.length)
}

/// Map a native type name (`DATA_TYPE`) to an abstract column definition.
pub fn classify(native_type: &str, size: CatalogSize) -> ColumnDefinition {
    RULES
        .iter()
        .find(|(needle, _)| native_type.contains(needle))
        .map(|(_, mapping)| mapping(size))
        .unwrap_or_else(|| ColumnDefinition::new(ColumnType::Text))
}

/// Native column type for an abstract column.
pub fn native_type_for(column: &Column) -> DialectResult<String> {
    let sql = match column.column_type {
        ColumnType::Integer => "INTEGER".to_string(),
        ColumnType::Date => "DATE".to_string(),
        ColumnType::Varchar => match column.size {
            Some(size) => format!("VARCHAR2({})", size),
            None => {
                return Err(DialectError::invalid(format!(
                    "varchar column '{}' requires a size",
                    column.name
                )));
            }
        },
        ColumnType::Decimal => match column.size {
            Some(size) => format!("NUMBER({},{})", size, column.scale.unwrap_or(0)),
            None => "NUMBER".to_string(),
        },
        ColumnType::Datetime | ColumnType::Timestamp => "TIMESTAMP".to_string(),
        ColumnType::Char => match column.size {
            Some(size) => format!("CHAR({})", size),
            None => "CHAR".to_string(),
        },
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::Float => match column.size {
            Some(size) => format!("FLOAT({},{})", size, column.scale.unwrap_or(0)),
            None => "FLOAT".to_string(),
        },
        ColumnType::Boolean => "TINYINT(1)".to_string(),
        ColumnType::BigInteger | ColumnType::Double | ColumnType::Blob | ColumnType::Json => {
            return Err(DialectError::UnrecognizedColumnType {
                column: column.name.clone(),
            });
        }
    };
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(native: &str) -> ColumnType {
        classify(native, CatalogSize::default()).column_type
    }

    #[test]
    fn test_classify_precedence() {
        assert_eq!(kind("NUMBER"), ColumnType::Decimal);
        assert_eq!(kind("INTEGER"), ColumnType::Integer);
        assert_eq!(kind("VARCHAR2"), ColumnType::Varchar);
        assert_eq!(kind("NVARCHAR2"), ColumnType::Varchar);
        assert_eq!(kind("BINARY_FLOAT"), ColumnType::Float);
        assert_eq!(kind("TIMESTAMP(6) WITH TIME ZONE"), ColumnType::Timestamp);
        assert_eq!(kind("DATE"), ColumnType::Date);
        assert_eq!(kind("LONG RAW"), ColumnType::Text);
        assert_eq!(kind("BLOB"), ColumnType::Text);
        assert_eq!(kind("NCLOB"), ColumnType::Text);
        assert_eq!(kind("NCHAR"), ColumnType::Char);
        assert_eq!(kind("INTERVAL DAY(2) TO SECOND(6)"), ColumnType::Text);
    }

    #[test]
    fn test_classify_earlier_rule_wins() {
        assert_eq!(kind("NUMBER_CHAR"), ColumnType::Decimal);
        // contains DATE but TIMESTAMP is checked first
        assert_eq!(kind("TIMESTAMP_DATE"), ColumnType::Timestamp);
        assert_eq!(kind("CLOB_CHAR"), ColumnType::Text);
        assert_eq!(kind("VARCHAR2_CHAR"), ColumnType::Varchar);
    }

    #[test]
    fn test_classify_number_sizes() {
        let def = classify("NUMBER", CatalogSize::new(Some(22), Some(10), Some(2)));
        assert_eq!(def.column_type, ColumnType::Decimal);
        assert!(def.is_numeric);
        assert_eq!(def.size, Some(10));
        assert_eq!(def.scale, Some(2));
        assert_eq!(def.bind_type, BindType::Decimal);
    }

    #[test]
    fn test_classify_varchar_uses_length() {
        let def = classify("VARCHAR2", CatalogSize::new(Some(100), None, None));
        assert_eq!(def.size, Some(100));
        assert!(!def.is_numeric);
        assert_eq!(def.bind_type, BindType::Str);
    }

    #[test]
    fn test_classify_integer_bind() {
        let def = classify("INTEGER", CatalogSize::new(Some(22), Some(38), Some(0)));
        assert_eq!(def.bind_type, BindType::Int);
        assert_eq!(def.size, Some(38));
        assert_eq!(def.scale, None);
    }

    fn col(column_type: ColumnType, size: Option<u32>, scale: Option<u32>) -> Column {
        Column::of_type(
            "c",
            ColumnDefinition::new(column_type).size(size).scale(scale),
        )
    }

    #[test]
    fn test_native_type_for() {
        assert_eq!(native_type_for(&col(ColumnType::Integer, None, None)).unwrap(), "INTEGER");
        assert_eq!(native_type_for(&col(ColumnType::Date, None, None)).unwrap(), "DATE");
        assert_eq!(native_type_for(&col(ColumnType::Varchar, Some(255), None)).unwrap(), "VARCHAR2(255)");
        assert_eq!(native_type_for(&col(ColumnType::Decimal, Some(10), Some(2))).unwrap(), "NUMBER(10,2)");
        assert_eq!(native_type_for(&col(ColumnType::Datetime, None, None)).unwrap(), "TIMESTAMP");
        assert_eq!(native_type_for(&col(ColumnType::Timestamp, None, None)).unwrap(), "TIMESTAMP");
        assert_eq!(native_type_for(&col(ColumnType::Char, Some(2), None)).unwrap(), "CHAR(2)");
        assert_eq!(native_type_for(&col(ColumnType::Text, None, None)).unwrap(), "TEXT");
        assert_eq!(native_type_for(&col(ColumnType::Float, Some(8), Some(3))).unwrap(), "FLOAT(8,3)");
        assert_eq!(native_type_for(&col(ColumnType::Boolean, None, None)).unwrap(), "TINYINT(1)");
    }

    #[test]
    fn test_native_type_for_rejects_unknown() {
        let column = Column::of_type("payload", ColumnDefinition::new(ColumnType::Json));
        let err = native_type_for(&column).unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized column type at column 'payload'");
    }

    #[test]
    fn test_native_type_for_varchar_without_size() {
        let err = native_type_for(&col(ColumnType::Varchar, None, None)).unwrap_err();
        assert!(matches!(err, DialectError::InvalidDefinition(_)));
    }
}
