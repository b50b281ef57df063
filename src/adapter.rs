//! Oracle adapter: runs dialect SQL through a [`Connection`] and rebuilds
//! abstract descriptors from the catalog rows.
//!
//! ```rust,ignore
//! let mut db = OracleAdapter::connect(&connector, &descriptor, OracleDialect::new())?;
//! for column in db.describe_columns("posts", Some("blog"))? {
//!     println!("{} {}", column.name, column.column_type);
//! }
//! ```
//!
//! An adapter owns its connection and is meant for one unit of work at a
//! time. Identity values come from explicit sequences, not auto-increment.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::connection::{Connection, Connector, Row, Value};
use crate::descriptor::ConnectionDescriptor;
use crate::dialect::oracle::{NOT_NULLABLE, PRIMARY_KEY_CONSTRAINT};
use crate::dialect::{OracleDialect, SqlDialect, ViewDefinition};
use crate::error::{DialectError, DialectResult};
use crate::pagination::{LimitSpec, apply_limit};
use crate::typemap::CatalogSize;
use crate::types::{Column, ColumnPosition, Index, RawValue, Reference, TableRef};

/// Sequence used by `last_insert_id` when none is named.
pub const DEFAULT_SEQUENCE: &str = "id";

pub struct OracleAdapter<C: Connection> {
    conn: C,
    dialect: OracleDialect,
}

impl<C: Connection> OracleAdapter<C> {
    /// Wrap an already open connection. No startup statements are run.
    pub fn new(conn: C, dialect: OracleDialect) -> Self {
        Self { conn, dialect }
    }

    /// Open a connection and run the descriptor's startup statements in
    /// order. The first failing statement aborts the rest; statements that
    /// already ran are not undone.
    pub fn connect<K>(
        connector: &K,
        descriptor: &ConnectionDescriptor,
        dialect: OracleDialect,
    ) -> DialectResult<Self>
    where
        K: Connector<Conn = C>,
    {
        info!("Connecting to {}", descriptor.target());
        let conn = connector.open(descriptor)?;
        let mut adapter = Self::new(conn, dialect);
        adapter.run_startup(descriptor)?;
        Ok(adapter)
    }

    /// Execute `startup` statements, fail-fast. Returns how many ran.
    pub fn run_startup(&mut self, descriptor: &ConnectionDescriptor) -> DialectResult<usize> {
        let statements = descriptor.startup_statements();
        for (i, sql) in statements.iter().enumerate() {
            debug!("Startup statement {}/{}", i + 1, statements.len());
            self.execute(sql)?;
        }
        if !statements.is_empty() {
            info!("Ran {} startup statement(s)", statements.len());
        }
        Ok(statements.len())
    }

    pub fn dialect(&self) -> &OracleDialect {
        &self.dialect
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    /// Run a query, passing collaborator errors through untouched.
    pub fn fetch_all(&mut self, sql: &str) -> DialectResult<Vec<Row>> {
        debug!(sql, "fetch");
        Ok(self.conn.fetch_all(sql)?)
    }

    pub fn execute(&mut self, sql: &str) -> DialectResult<u64> {
        debug!(sql, "execute");
        Ok(self.conn.execute(sql)?)
    }

    /// Run `sql` with row limiting applied and return rows `offset + 1`
    /// through `offset + limit` of the inner query.
    ///
    /// `ROWNUM` counts from 1, so the `ORD >= offset` filter lets the row at
    /// ordinal `offset` through; it is dropped here. The synthetic ordinal
    /// column is stripped so rows carry exactly the inner query's columns.
    pub fn fetch_limited(&mut self, sql: &str, spec: impl Into<LimitSpec>) -> DialectResult<Vec<Row>> {
        let spec = spec.into();
        let offset = spec.offset();
        let rows = self.fetch_all(&apply_limit(sql, spec))?;

        Ok(rows
            .into_iter()
            .filter_map(|mut row| {
                let ordinal = row.pop().as_ref().and_then(Value::as_i64);
                match ordinal {
                    Some(ord) if ord <= 0 || (ord as u64) <= offset => None,
                    _ => Some(row),
                }
            })
            .collect())
    }

    // ===== Catalog =====

    /// Columns of `table` in declared order.
    pub fn describe_columns(&mut self, table: &str, schema: Option<&str>) -> DialectResult<Vec<Column>> {
        let sql = self.dialect.describe_columns(table, schema);
        let rows = self.fetch_all(&sql)?;

        let mut columns = Vec::with_capacity(rows.len());
        let mut previous: Option<String> = None;

        for row in &rows {
            let name = required_text(row, 0, "COLUMN_NAME")?;
            let native_type = text_at(row, 1).unwrap_or_default();
            let size = CatalogSize::new(u32_at(row, 2), u32_at(row, 3), u32_at(row, 4));
            let definition = self.dialect.classify_type(&native_type, size);

            let position = match previous.take() {
                None => ColumnPosition::First,
                Some(prev) => ColumnPosition::After(prev),
            };

            let mut column = Column::new(name.clone(), definition, position);
            column.primary = text_at(row, 6).as_deref() == Some(PRIMARY_KEY_CONSTRAINT);
            column.not_null = text_at(row, 5).as_deref() == Some(NOT_NULLABLE);
            column.default = text_at(row, 7)
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty());

            columns.push(column);
            previous = Some(name);
        }

        debug!("Described {} column(s) of {}", columns.len(), table);
        Ok(columns)
    }

    /// Indexes of `table`, each with its columns in key order. Without a
    /// schema, same-named indexes of different owners stay separate.
    pub fn describe_indexes(&mut self, table: &str, schema: Option<&str>) -> DialectResult<Vec<Index>> {
        let sql = self.dialect.describe_indexes(table, schema);
        let rows = self.fetch_all(&sql)?;

        let mut indexes: Vec<Index> = Vec::new();
        let mut by_key: HashMap<(Option<String>, String), usize> = HashMap::new();

        for row in &rows {
            let name = required_text(row, 2, "INDEX_NAME")?;
            let column = required_text(row, 4, "COLUMN_NAME")?;
            let owner = text_at(row, 5);

            let slot = *by_key.entry((owner.clone(), name.clone())).or_insert_with(|| {
                indexes.push(Index {
                    table: text_at(row, 0).unwrap_or_else(|| table.to_string()),
                    schema: owner,
                    name,
                    columns: Vec::new(),
                });
                indexes.len() - 1
            });
            indexes[slot].columns.push(column);
        }

        Ok(indexes)
    }

    /// Foreign keys declared on `table`.
    pub fn describe_references(
        &mut self,
        table: &str,
        schema: Option<&str>,
    ) -> DialectResult<Vec<Reference>> {
        let sql = self.dialect.describe_references(table, schema);
        let rows = self.fetch_all(&sql)?;

        let mut references: Vec<Reference> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for row in &rows {
            let name = required_text(row, 2, "CONSTRAINT_NAME")?;

            let slot = match by_name.get(&name) {
                Some(&slot) => slot,
                None => {
                    references.push(Reference {
                        table: text_at(row, 0).unwrap_or_else(|| table.to_string()),
                        name: name.clone(),
                        columns: Vec::new(),
                        referenced_schema: text_at(row, 3),
                        referenced_table: required_text(row, 4, "R_TABLE_NAME")?,
                        referenced_columns: Vec::new(),
                    });
                    by_name.insert(name, references.len() - 1);
                    references.len() - 1
                }
            };

            references[slot].columns.push(required_text(row, 1, "COLUMN_NAME")?);
            references[slot]
                .referenced_columns
                .push(required_text(row, 5, "R_COLUMN_NAME")?);
        }

        Ok(references)
    }

    pub fn list_tables(&mut self, schema: Option<&str>) -> DialectResult<Vec<TableRef>> {
        let sql = self.dialect.list_tables(schema);
        self.fetch_all(&sql)?
            .iter()
            .map(|row| {
                let name = required_text(row, 0, "TABLE_NAME")?;
                Ok(match text_at(row, 1) {
                    Some(owner) => TableRef::in_schema(name, owner),
                    None => TableRef::new(name),
                })
            })
            .collect()
    }

    pub fn list_views(&mut self, schema: Option<&str>) -> DialectResult<Vec<String>> {
        let sql = self.dialect.list_views(schema);
        self.fetch_all(&sql)?
            .iter()
            .map(|row| required_text(row, 0, "VIEW_NAME"))
            .collect()
    }

    pub fn table_exists(&mut self, table: &str, schema: Option<&str>) -> DialectResult<bool> {
        let sql = self.dialect.table_exists(table, schema);
        self.fetch_flag(&sql)
    }

    pub fn view_exists(&mut self, view: &str, schema: Option<&str>) -> DialectResult<bool> {
        let sql = self.dialect.view_exists(view, schema);
        self.fetch_flag(&sql)
    }

    fn fetch_flag(&mut self, sql: &str) -> DialectResult<bool> {
        let rows = self.fetch_all(sql)?;
        rows.first()
            .and_then(|row| row.first())
            .and_then(Value::as_i64)
            .map(|ret| ret > 0)
            .ok_or_else(|| DialectError::MissingValue("existence check returned no RET value".to_string()))
    }

    // ===== DDL =====

    pub fn create_view(
        &mut self,
        view: &str,
        definition: &ViewDefinition,
        schema: Option<&str>,
    ) -> DialectResult<()> {
        let sql = self.dialect.create_view(view, definition, schema)?;
        self.execute(&sql)?;
        Ok(())
    }

    pub fn drop_view(&mut self, view: &str, schema: Option<&str>, if_exists: bool) -> DialectResult<()> {
        let sql = self.dialect.drop_view(view, schema, if_exists);
        self.execute(&sql)?;
        Ok(())
    }

    /// Drop a table. With `if_exists`, a "table or view does not exist"
    /// error is suppressed and `Ok(false)` returned; any other error
    /// propagates unchanged.
    pub fn drop_table(&mut self, table: &str, schema: Option<&str>, if_exists: bool) -> DialectResult<bool> {
        let sql = self.dialect.drop_table(table, schema, false);
        match self.execute(&sql) {
            Ok(_) => Ok(true),
            Err(DialectError::Execution(e)) if if_exists && e.is_missing_object() => {
                warn!("Table {} does not exist, nothing to drop", table);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // ===== Identity =====

    /// Current value of `sequence` in this session (`id` by default).
    /// Fails when the session has not drawn from the sequence yet.
    pub fn last_insert_id(&mut self, sequence: Option<&str>) -> DialectResult<i64> {
        let sequence = sequence
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SEQUENCE);
        let sql = format!("SELECT {}.CURRVAL FROM DUAL", sequence);

        let rows = self.fetch_all(&sql)?;
        rows.first()
            .and_then(|row| row.first())
            .and_then(Value::as_i64)
            .ok_or_else(|| DialectError::MissingValue(format!("sequence {} returned no current value", sequence)))
    }

    /// Identity columns are filled by the engine, never by the caller.
    pub fn use_explicit_id_value(&self) -> bool {
        false
    }

    /// Inserted in place of an identity value.
    pub fn default_id_value(&self) -> RawValue {
        RawValue::new("default")
    }

    pub fn supports_sequences(&self) -> bool {
        true
    }
}

fn text_at(row: &Row, idx: usize) -> Option<String> {
    row.get(idx).and_then(Value::to_text)
}

fn u32_at(row: &Row, idx: usize) -> Option<u32> {
    row.get(idx).and_then(Value::as_u32)
}

fn required_text(row: &Row, idx: usize, what: &str) -> DialectResult<String> {
    text_at(row, idx).ok_or_else(|| DialectError::MissingValue(format!("catalog row has no {} (column {})", what, idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ExecutionError;

    /// Replays one canned result for every query.
    struct Canned(Vec<Row>);

    impl Connection for Canned {
        fn fetch_all(&mut self, _sql: &str) -> Result<Vec<Row>, ExecutionError> {
            Ok(self.0.clone())
        }

        fn execute(&mut self, _sql: &str) -> Result<u64, ExecutionError> {
            Ok(0)
        }
    }

    fn adapter(rows: Vec<Row>) -> OracleAdapter<Canned> {
        OracleAdapter::new(Canned(rows), OracleDialect::new())
    }

    #[test]
    fn test_identity_semantics() {
        let db = adapter(vec![]);
        assert!(!db.use_explicit_id_value());
        assert!(db.supports_sequences());
        assert_eq!(db.default_id_value().to_string(), "default");
    }

    #[test]
    fn test_fetch_flag_needs_a_value() {
        let mut db = adapter(vec![]);
        assert!(matches!(
            db.table_exists("posts", None),
            Err(DialectError::MissingValue(_))
        ));

        let mut db = adapter(vec![vec![Value::Int(1)]]);
        assert!(db.table_exists("posts", None).unwrap());

        let mut db = adapter(vec![vec![Value::Text("0".into())]]);
        assert!(!db.view_exists("recent", None).unwrap());
    }

    #[test]
    fn test_column_name_is_required() {
        let mut db = adapter(vec![vec![Value::Null, "NUMBER".into()]]);
        let err = db.describe_columns("posts", None).unwrap_err();
        assert_eq!(err.to_string(), "Missing value: catalog row has no COLUMN_NAME (column 0)");
    }

    #[test]
    fn test_fetch_limited_strips_ordinal() {
        let mut db = adapter(vec![vec!["a".into(), Value::Int(1), Value::Int(21)]]);
        let rows = db.fetch_limited("SELECT X, Y FROM T", (10u64, 20u64)).unwrap();
        assert_eq!(rows, vec![vec![Value::from("a"), Value::Int(1)]]);
    }

    #[test]
    fn test_fetch_limited_drops_row_at_offset() {
        let mut db = adapter(vec![
            vec!["a".into(), Value::Int(20)],
            vec!["b".into(), Value::Int(21)],
        ]);
        let rows = db.fetch_limited("SELECT X FROM T", (10u64, 20u64)).unwrap();
        assert_eq!(rows, vec![vec![Value::from("b")]]);
    }
}
