//! Dialect capability set.
//!
//! [`SqlDialect`] is the seam between the introspection layer and an
//! engine's SQL text rules. Every method is a pure text builder: nothing here
//! touches a connection. DDL that an engine cannot express cleanly is
//! reported through [`DialectError::Unsupported`], and [`SqlDialect::plan`]
//! turns that into a [`Capability`] so callers can feature-detect instead of
//! matching on errors.

pub mod oracle;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, DialectResult};
use crate::escape::{IdentifierRules, QuotePolicy};
use crate::pagination::LimitSpec;
use crate::typemap::CatalogSize;
use crate::types::{Column, ColumnDefinition, Index, Reference};

pub use oracle::OracleDialect;

/// DDL statements a dialect may or may not be able to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DdlOperation {
    AddColumn,
    ModifyColumn,
    DropColumn,
    AddIndex,
    DropIndex,
    AddPrimaryKey,
    DropPrimaryKey,
    AddForeignKey,
    DropForeignKey,
    CreateTable,
    DropTable,
    CreateView,
    DropView,
}

impl DdlOperation {
    pub const ALL: [DdlOperation; 13] = [
        DdlOperation::AddColumn,
        DdlOperation::ModifyColumn,
        DdlOperation::DropColumn,
        DdlOperation::AddIndex,
        DdlOperation::DropIndex,
        DdlOperation::AddPrimaryKey,
        DdlOperation::DropPrimaryKey,
        DdlOperation::AddForeignKey,
        DdlOperation::DropForeignKey,
        DdlOperation::CreateTable,
        DdlOperation::DropTable,
        DdlOperation::CreateView,
        DdlOperation::DropView,
    ];
}

impl fmt::Display for DdlOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DdlOperation::AddColumn => "ADD COLUMN",
            DdlOperation::ModifyColumn => "MODIFY COLUMN",
            DdlOperation::DropColumn => "DROP COLUMN",
            DdlOperation::AddIndex => "ADD INDEX",
            DdlOperation::DropIndex => "DROP INDEX",
            DdlOperation::AddPrimaryKey => "ADD PRIMARY KEY",
            DdlOperation::DropPrimaryKey => "DROP PRIMARY KEY",
            DdlOperation::AddForeignKey => "ADD FOREIGN KEY",
            DdlOperation::DropForeignKey => "DROP FOREIGN KEY",
            DdlOperation::CreateTable => "CREATE TABLE",
            DdlOperation::DropTable => "DROP TABLE",
            DdlOperation::CreateView => "CREATE VIEW",
            DdlOperation::DropView => "DROP VIEW",
        };
        f.write_str(name)
    }
}

/// Outcome of asking a dialect for DDL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Supported(String),
    Unsupported(DdlOperation),
}

impl Capability {
    pub fn is_supported(&self) -> bool {
        matches!(self, Capability::Supported(_))
    }

    /// Back to the error form for callers that prefer `?`.
    pub fn into_result(self) -> DialectResult<String> {
        match self {
            Capability::Supported(sql) => Ok(sql),
            Capability::Unsupported(op) => Err(DialectError::Unsupported(op)),
        }
    }
}

/// Definition accepted by view creation. `sql` is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub sql: Option<String>,
}

impl ViewDefinition {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: Some(sql.into()),
        }
    }

    /// The view body, rejecting a missing or blank `sql` entry.
    pub fn sql(&self) -> DialectResult<&str> {
        match self.sql.as_deref() {
            Some(sql) if !sql.trim().is_empty() => Ok(sql),
            _ => Err(DialectError::invalid(
                "view definition requires a non-empty 'sql' entry",
            )),
        }
    }
}

/// A DDL request with its arguments, for [`SqlDialect::plan`].
#[derive(Debug, Clone, Copy)]
pub enum DdlRequest<'a> {
    AddColumn {
        table: &'a str,
        schema: Option<&'a str>,
        column: &'a Column,
    },
    ModifyColumn {
        table: &'a str,
        schema: Option<&'a str>,
        column: &'a Column,
        current: Option<&'a Column>,
    },
    DropColumn {
        table: &'a str,
        schema: Option<&'a str>,
        column: &'a str,
    },
    AddIndex {
        table: &'a str,
        schema: Option<&'a str>,
        index: &'a Index,
    },
    DropIndex {
        table: &'a str,
        schema: Option<&'a str>,
        index: &'a str,
    },
    AddPrimaryKey {
        table: &'a str,
        schema: Option<&'a str>,
        index: &'a Index,
    },
    DropPrimaryKey {
        table: &'a str,
        schema: Option<&'a str>,
    },
    AddForeignKey {
        table: &'a str,
        schema: Option<&'a str>,
        reference: &'a Reference,
    },
    DropForeignKey {
        table: &'a str,
        schema: Option<&'a str>,
        reference: &'a str,
    },
    CreateTable {
        table: &'a str,
        schema: Option<&'a str>,
        columns: &'a [Column],
    },
    DropTable {
        table: &'a str,
        schema: Option<&'a str>,
        if_exists: bool,
    },
    CreateView {
        view: &'a str,
        schema: Option<&'a str>,
        definition: &'a ViewDefinition,
    },
    DropView {
        view: &'a str,
        schema: Option<&'a str>,
        if_exists: bool,
    },
}

impl DdlRequest<'_> {
    pub fn operation(&self) -> DdlOperation {
        match self {
            DdlRequest::AddColumn { .. } => DdlOperation::AddColumn,
            DdlRequest::ModifyColumn { .. } => DdlOperation::ModifyColumn,
            DdlRequest::DropColumn { .. } => DdlOperation::DropColumn,
            DdlRequest::AddIndex { .. } => DdlOperation::AddIndex,
            DdlRequest::DropIndex { .. } => DdlOperation::DropIndex,
            DdlRequest::AddPrimaryKey { .. } => DdlOperation::AddPrimaryKey,
            DdlRequest::DropPrimaryKey { .. } => DdlOperation::DropPrimaryKey,
            DdlRequest::AddForeignKey { .. } => DdlOperation::AddForeignKey,
            DdlRequest::DropForeignKey { .. } => DdlOperation::DropForeignKey,
            DdlRequest::CreateTable { .. } => DdlOperation::CreateTable,
            DdlRequest::DropTable { .. } => DdlOperation::DropTable,
            DdlRequest::CreateView { .. } => DdlOperation::CreateView,
            DdlRequest::DropView { .. } => DdlOperation::DropView,
        }
    }
}

/// SQL text rules of one engine.
pub trait SqlDialect {
    /// Short engine name, e.g. `"oracle"`.
    fn name(&self) -> &'static str;

    /// Identifier folding and default quoting shared by every builder.
    fn rules(&self) -> &IdentifierRules;

    fn escape(&self, value: &str, policy: Option<QuotePolicy>) -> String {
        self.rules().escape(value, policy)
    }

    fn escape_schema(&self, value: &str, policy: Option<QuotePolicy>) -> String {
        self.rules().escape_schema(value, policy)
    }

    /// Quote a case-sensitive identifier.
    fn quote_identifier(&self, id: &str) -> String;

    /// Positional bind placeholder (1-based).
    fn placeholder(&self, index: usize) -> String;

    fn bool_literal(&self, val: bool) -> String;

    // ===== Queries =====

    fn limit(&self, sql: &str, spec: LimitSpec) -> String;

    fn shared_lock(&self, sql: &str) -> String;

    fn for_update(&self, sql: &str) -> String {
        format!("{} FOR UPDATE", sql)
    }

    // ===== Types =====

    fn classify_type(&self, native_type: &str, size: CatalogSize) -> ColumnDefinition;

    fn native_type_for(&self, column: &Column) -> DialectResult<String>;

    // ===== Catalog =====

    fn list_tables(&self, schema: Option<&str>) -> String;

    fn table_exists(&self, table: &str, schema: Option<&str>) -> String;

    fn list_views(&self, schema: Option<&str>) -> String;

    fn view_exists(&self, view: &str, schema: Option<&str>) -> String;

    fn describe_columns(&self, table: &str, schema: Option<&str>) -> String;

    fn describe_indexes(&self, table: &str, schema: Option<&str>) -> String;

    fn describe_references(&self, table: &str, schema: Option<&str>) -> String;

    fn table_options(&self, table: &str, schema: Option<&str>) -> String;

    fn supports_savepoints(&self) -> bool;

    fn supports_release_savepoints(&self) -> bool;

    // ===== DDL =====

    fn add_column(&self, table: &str, schema: Option<&str>, column: &Column) -> DialectResult<String>;

    fn modify_column(
        &self,
        table: &str,
        schema: Option<&str>,
        column: &Column,
        current: Option<&Column>,
    ) -> DialectResult<String>;

    fn drop_column(&self, table: &str, schema: Option<&str>, column: &str) -> DialectResult<String>;

    fn add_index(&self, table: &str, schema: Option<&str>, index: &Index) -> DialectResult<String>;

    fn drop_index(&self, table: &str, schema: Option<&str>, index: &str) -> DialectResult<String>;

    fn add_primary_key(&self, table: &str, schema: Option<&str>, index: &Index) -> DialectResult<String>;

    fn drop_primary_key(&self, table: &str, schema: Option<&str>) -> DialectResult<String>;

    fn add_foreign_key(
        &self,
        table: &str,
        schema: Option<&str>,
        reference: &Reference,
    ) -> DialectResult<String>;

    fn drop_foreign_key(&self, table: &str, schema: Option<&str>, reference: &str) -> DialectResult<String>;

    fn create_table(&self, table: &str, schema: Option<&str>, columns: &[Column]) -> DialectResult<String>;

    fn drop_table(&self, table: &str, schema: Option<&str>, if_exists: bool) -> String;

    fn create_view(
        &self,
        view: &str,
        definition: &ViewDefinition,
        schema: Option<&str>,
    ) -> DialectResult<String>;

    fn drop_view(&self, view: &str, schema: Option<&str>, if_exists: bool) -> String;

    // ===== Capabilities =====

    /// DDL operations this dialect can generate.
    fn capabilities(&self) -> &'static [DdlOperation];

    fn supports(&self, op: DdlOperation) -> bool {
        self.capabilities().contains(&op)
    }

    /// Generate DDL for `request`, reporting capability gaps as a value.
    /// Invalid input still fails.
    fn plan(&self, request: &DdlRequest<'_>) -> DialectResult<Capability> {
        let generated = match *request {
            DdlRequest::AddColumn { table, schema, column } => self.add_column(table, schema, column),
            DdlRequest::ModifyColumn {
                table,
                schema,
                column,
                current,
            } => self.modify_column(table, schema, column, current),
            DdlRequest::DropColumn { table, schema, column } => self.drop_column(table, schema, column),
            DdlRequest::AddIndex { table, schema, index } => self.add_index(table, schema, index),
            DdlRequest::DropIndex { table, schema, index } => self.drop_index(table, schema, index),
            DdlRequest::AddPrimaryKey { table, schema, index } => {
                self.add_primary_key(table, schema, index)
            }
            DdlRequest::DropPrimaryKey { table, schema } => self.drop_primary_key(table, schema),
            DdlRequest::AddForeignKey {
                table,
                schema,
                reference,
            } => self.add_foreign_key(table, schema, reference),
            DdlRequest::DropForeignKey {
                table,
                schema,
                reference,
            } => self.drop_foreign_key(table, schema, reference),
            DdlRequest::CreateTable { table, schema, columns } => self.create_table(table, schema, columns),
            DdlRequest::DropTable {
                table,
                schema,
                if_exists,
            } => Ok(self.drop_table(table, schema, if_exists)),
            DdlRequest::CreateView {
                view,
                schema,
                definition,
            } => self.create_view(view, definition, schema),
            DdlRequest::DropView {
                view,
                schema,
                if_exists,
            } => Ok(self.drop_view(view, schema, if_exists)),
        };

        match generated {
            Ok(sql) => Ok(Capability::Supported(sql)),
            Err(DialectError::Unsupported(op)) => Ok(Capability::Unsupported(op)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_definition_requires_sql() {
        assert!(ViewDefinition::default().sql().is_err());
        assert!(ViewDefinition::new("   ").sql().is_err());
        assert_eq!(ViewDefinition::new("SELECT 1 FROM DUAL").sql().unwrap(), "SELECT 1 FROM DUAL");
    }

    #[test]
    fn test_capability_into_result() {
        assert_eq!(Capability::Supported("DROP VIEW V".into()).into_result().unwrap(), "DROP VIEW V");
        let err = Capability::Unsupported(DdlOperation::AddIndex).into_result().unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(DdlOperation::DropPrimaryKey.to_string(), "DROP PRIMARY KEY");
        assert_eq!(DdlOperation::ALL.len(), 13);
    }
}
