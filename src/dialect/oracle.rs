//! Oracle SQL dialect.
//!
//! Catalog lookups go through the `ALL_*` views. Names compared against the
//! catalog are folded to upper case and embedded as string literals, which is
//! how Oracle stores unquoted identifiers.
//!
//! ```
//! use oradialect::dialect::{OracleDialect, SqlDialect};
//!
//! let dialect = OracleDialect::new();
//! assert_eq!(
//!     dialect.table_exists("posts", None),
//!     "SELECT CASE WHEN COUNT(*)>0 THEN 1 ELSE 0 END RET FROM ALL_TABLES WHERE TABLE_NAME = 'POSTS'"
//! );
//! ```

use super::{DdlOperation, SqlDialect, ViewDefinition};
use crate::error::{DialectError, DialectResult};
use crate::escape::{CaseFolding, IdentifierRules, QuotePolicy, escape};
use crate::pagination::{LimitSpec, apply_limit};
use crate::typemap::{self, CatalogSize};
use crate::types::{Column, ColumnDefinition, Index, Reference};

/// Constraint type code of a primary key in `ALL_CONSTRAINTS`.
pub const PRIMARY_KEY_CONSTRAINT: &str = "P";

/// `NULLABLE` value of a column that rejects NULL.
pub const NOT_NULLABLE: &str = "N";

const SUPPORTED_DDL: &[DdlOperation] = &[
    DdlOperation::CreateView,
    DdlOperation::DropView,
    DdlOperation::DropTable,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleDialect {
    rules: IdentifierRules,
}

impl Default for OracleDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleDialect {
    /// Upper-case folding, identifiers left bare.
    pub fn new() -> Self {
        Self::with_quote(QuotePolicy::Bare)
    }

    /// Same folding, different default quoting for `escape(.., None)`.
    pub fn with_quote(default_quote: QuotePolicy) -> Self {
        Self {
            rules: IdentifierRules::new(CaseFolding::Upper, default_quote),
        }
    }

    /// The default quote policy this dialect was built with.
    pub fn quote_policy(&self) -> QuotePolicy {
        self.rules.default_quote
    }

    fn literal(&self, name: &str) -> String {
        self.rules.catalog_literal(name)
    }

    /// Default policy for identifier positions in DDL. String quotes are
    /// never valid there, so `Literal` falls back to `Bare`.
    fn ddl_identifier_policy(&self) -> QuotePolicy {
        match self.rules.default_quote {
            QuotePolicy::Literal => QuotePolicy::Bare,
            policy => policy,
        }
    }

    fn unsupported(op: DdlOperation) -> DialectResult<String> {
        Err(DialectError::Unsupported(op))
    }
}

fn non_empty(schema: Option<&str>) -> Option<&str> {
    schema.filter(|s| !s.trim().is_empty())
}

impl SqlDialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn rules(&self) -> &IdentifierRules {
        &self.rules
    }

    fn quote_identifier(&self, id: &str) -> String {
        // Double quotes make the identifier case-sensitive
        format!("\"{}\"", id.replace('"', "\"\""))
    }

    fn placeholder(&self, index: usize) -> String {
        format!(":{}", index)
    }

    fn bool_literal(&self, val: bool) -> String {
        // No SQL BOOLEAN; booleans live in a one-digit integer column
        if val { "1".to_string() } else { "0".to_string() }
    }

    fn limit(&self, sql: &str, spec: LimitSpec) -> String {
        apply_limit(sql, spec)
    }

    fn shared_lock(&self, sql: &str) -> String {
        format!("{} LOCK IN SHARE MODE", sql)
    }

    fn classify_type(&self, native_type: &str, size: CatalogSize) -> ColumnDefinition {
        typemap::classify(native_type, size)
    }

    fn native_type_for(&self, column: &Column) -> DialectResult<String> {
        typemap::native_type_for(column)
    }

    fn list_tables(&self, schema: Option<&str>) -> String {
        let mut sql = String::from("SELECT TABLE_NAME, OWNER FROM ALL_TABLES");
        if let Some(schema) = non_empty(schema) {
            sql.push_str(&format!(" WHERE OWNER = {}", self.literal(schema)));
        }
        sql.push_str(" ORDER BY OWNER, TABLE_NAME");
        sql
    }

    fn table_exists(&self, table: &str, schema: Option<&str>) -> String {
        let mut sql = format!(
            "SELECT CASE WHEN COUNT(*)>0 THEN 1 ELSE 0 END RET FROM ALL_TABLES WHERE TABLE_NAME = {}",
            self.literal(table)
        );
        if let Some(schema) = non_empty(schema) {
            sql.push_str(&format!(" AND OWNER = {}", self.literal(schema)));
        }
        sql
    }

    fn list_views(&self, schema: Option<&str>) -> String {
        let mut sql = String::from("SELECT VIEW_NAME FROM ALL_VIEWS");
        if let Some(schema) = non_empty(schema) {
            sql.push_str(&format!(" WHERE OWNER = {}", self.literal(schema)));
        }
        sql.push_str(" ORDER BY VIEW_NAME");
        sql
    }

    fn view_exists(&self, view: &str, schema: Option<&str>) -> String {
        let mut sql = format!(
            "SELECT CASE WHEN COUNT(*)>0 THEN 1 ELSE 0 END RET FROM ALL_VIEWS WHERE VIEW_NAME = {}",
            self.literal(view)
        );
        if let Some(schema) = non_empty(schema) {
            sql.push_str(&format!(" AND OWNER = {}", self.literal(schema)));
        }
        sql
    }

    /// Columns in `COLUMN_ID` order. Result positions:
    /// 0 name, 1 type, 2 length, 3 precision, 4 scale, 5 nullable,
    /// 6 constraint type, 7 default, 8 key position.
    fn describe_columns(&self, table: &str, schema: Option<&str>) -> String {
        let mut sql = format!(
            "SELECT TC.COLUMN_NAME, TC.DATA_TYPE, TC.DATA_LENGTH, TC.DATA_PRECISION, TC.DATA_SCALE, \
             TC.NULLABLE, C.CONSTRAINT_TYPE, TC.DATA_DEFAULT, CC.POSITION \
             FROM ALL_TAB_COLUMNS TC LEFT JOIN (ALL_CONS_COLUMNS CC JOIN ALL_CONSTRAINTS C \
             ON CC.CONSTRAINT_NAME=C.CONSTRAINT_NAME AND CC.TABLE_NAME=C.TABLE_NAME AND CC.OWNER=C.OWNER \
             AND C.CONSTRAINT_TYPE='{pk}') \
             ON TC.TABLE_NAME=CC.TABLE_NAME AND TC.COLUMN_NAME=CC.COLUMN_NAME \
             WHERE TC.TABLE_NAME={}",
            self.literal(table),
            pk = PRIMARY_KEY_CONSTRAINT,
        );
        if let Some(schema) = non_empty(schema) {
            sql.push_str(&format!(" AND TC.OWNER={}", self.literal(schema)));
        }
        sql.push_str(" ORDER BY TC.COLUMN_ID");
        sql
    }

    /// Result positions: 0 table, 1 filler, 2 index name, 3 column position,
    /// 4 column name, 5 index owner.
    fn describe_indexes(&self, table: &str, schema: Option<&str>) -> String {
        let mut sql = format!(
            "SELECT I.TABLE_NAME, 0 AS C0, I.INDEX_NAME, IC.COLUMN_POSITION, IC.COLUMN_NAME, I.OWNER \
             FROM ALL_INDEXES I JOIN ALL_IND_COLUMNS IC \
             ON I.INDEX_NAME = IC.INDEX_NAME AND I.OWNER = IC.INDEX_OWNER \
             WHERE I.TABLE_NAME = {}",
            self.literal(table)
        );
        if let Some(schema) = non_empty(schema) {
            sql.push_str(&format!(" AND IC.INDEX_OWNER = {}", self.literal(schema)));
        }
        sql.push_str(" ORDER BY I.OWNER, I.INDEX_NAME, IC.COLUMN_POSITION");
        sql
    }

    /// Result positions: 0 table, 1 column, 2 constraint name,
    /// 3 referenced owner, 4 referenced table, 5 referenced column.
    fn describe_references(&self, table: &str, schema: Option<&str>) -> String {
        let mut sql = String::from(
            "SELECT AC.TABLE_NAME, CC.COLUMN_NAME, AC.CONSTRAINT_NAME, AC.R_OWNER, \
             RCC.TABLE_NAME R_TABLE_NAME, RCC.COLUMN_NAME R_COLUMN_NAME \
             FROM ALL_CONSTRAINTS AC \
             JOIN ALL_CONS_COLUMNS CC ON AC.CONSTRAINT_NAME = CC.CONSTRAINT_NAME AND AC.OWNER = CC.OWNER \
             JOIN ALL_CONS_COLUMNS RCC ON AC.R_OWNER = RCC.OWNER \
             AND AC.R_CONSTRAINT_NAME = RCC.CONSTRAINT_NAME AND CC.POSITION = RCC.POSITION \
             WHERE AC.CONSTRAINT_TYPE = 'R'",
        );
        if let Some(schema) = non_empty(schema) {
            sql.push_str(&format!(" AND AC.OWNER = {}", self.literal(schema)));
        }
        sql.push_str(&format!(" AND AC.TABLE_NAME = {}", self.literal(table)));
        sql.push_str(" ORDER BY AC.CONSTRAINT_NAME, CC.POSITION");
        sql
    }

    fn table_options(&self, _table: &str, _schema: Option<&str>) -> String {
        String::new()
    }

    fn supports_savepoints(&self) -> bool {
        false
    }

    fn supports_release_savepoints(&self) -> bool {
        false
    }

    fn add_column(&self, _table: &str, _schema: Option<&str>, _column: &Column) -> DialectResult<String> {
        Self::unsupported(DdlOperation::AddColumn)
    }

    fn modify_column(
        &self,
        _table: &str,
        _schema: Option<&str>,
        _column: &Column,
        _current: Option<&Column>,
    ) -> DialectResult<String> {
        Self::unsupported(DdlOperation::ModifyColumn)
    }

    fn drop_column(&self, _table: &str, _schema: Option<&str>, _column: &str) -> DialectResult<String> {
        Self::unsupported(DdlOperation::DropColumn)
    }

    fn add_index(&self, _table: &str, _schema: Option<&str>, _index: &Index) -> DialectResult<String> {
        Self::unsupported(DdlOperation::AddIndex)
    }

    fn drop_index(&self, _table: &str, _schema: Option<&str>, _index: &str) -> DialectResult<String> {
        Self::unsupported(DdlOperation::DropIndex)
    }

    fn add_primary_key(&self, _table: &str, _schema: Option<&str>, _index: &Index) -> DialectResult<String> {
        Self::unsupported(DdlOperation::AddPrimaryKey)
    }

    fn drop_primary_key(&self, _table: &str, _schema: Option<&str>) -> DialectResult<String> {
        Self::unsupported(DdlOperation::DropPrimaryKey)
    }

    fn add_foreign_key(
        &self,
        _table: &str,
        _schema: Option<&str>,
        _reference: &Reference,
    ) -> DialectResult<String> {
        Self::unsupported(DdlOperation::AddForeignKey)
    }

    fn drop_foreign_key(&self, _table: &str, _schema: Option<&str>, _reference: &str) -> DialectResult<String> {
        Self::unsupported(DdlOperation::DropForeignKey)
    }

    fn create_table(&self, _table: &str, _schema: Option<&str>, _columns: &[Column]) -> DialectResult<String> {
        Self::unsupported(DdlOperation::CreateTable)
    }

    /// With `if_exists`, ORA-00942 is swallowed inside a PL/SQL block and
    /// every other error is re-raised.
    fn drop_table(&self, table: &str, schema: Option<&str>, if_exists: bool) -> String {
        let table = self
            .rules
            .prepare_table(table, non_empty(schema), None, Some(QuotePolicy::Bare));
        let sql = format!("DROP TABLE {}", table);

        if !if_exists {
            return sql;
        }

        format!(
            "BEGIN EXECUTE IMMEDIATE {}; EXCEPTION WHEN OTHERS THEN IF SQLCODE != {} THEN RAISE; END IF; END;",
            escape(&sql, QuotePolicy::Literal),
            crate::connection::TABLE_OR_VIEW_DOES_NOT_EXIST,
        )
    }

    fn create_view(
        &self,
        view: &str,
        definition: &ViewDefinition,
        schema: Option<&str>,
    ) -> DialectResult<String> {
        let body = definition.sql()?;
        let view = self.rules.prepare_table(
            view,
            non_empty(schema),
            None,
            Some(self.ddl_identifier_policy()),
        );
        Ok(format!("CREATE VIEW {} AS {}", self.rules.fold(&view), body))
    }

    /// With `if_exists`, the drop only runs when `ALL_VIEWS` has a match.
    fn drop_view(&self, view: &str, schema: Option<&str>, if_exists: bool) -> String {
        let schema = non_empty(schema);
        let qualified = self
            .rules
            .fold(&self.rules.prepare_table(view, schema, None, Some(QuotePolicy::Bare)));
        let sql = format!("DROP VIEW {}", qualified);

        if !if_exists {
            return sql;
        }

        let mut filter = format!("VIEW_NAME = {}", self.literal(view));
        if let Some(schema) = schema {
            filter.push_str(&format!(" AND OWNER = {}", self.literal(schema)));
        }

        format!(
            "BEGIN FOR i IN (SELECT NULL FROM ALL_VIEWS WHERE {}) LOOP EXECUTE IMMEDIATE {}; END LOOP; END;",
            filter,
            escape(&sql, QuotePolicy::Literal),
        )
    }

    fn capabilities(&self) -> &'static [DdlOperation] {
        SUPPORTED_DDL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Capability, DdlRequest};
    use crate::types::ColumnType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_exists() {
        let d = OracleDialect::new();
        assert_eq!(
            d.table_exists("posts", None),
            "SELECT CASE WHEN COUNT(*)>0 THEN 1 ELSE 0 END RET FROM ALL_TABLES WHERE TABLE_NAME = 'POSTS'"
        );
        assert_eq!(
            d.table_exists("posts", Some("blog")),
            "SELECT CASE WHEN COUNT(*)>0 THEN 1 ELSE 0 END RET FROM ALL_TABLES \
             WHERE TABLE_NAME = 'POSTS' AND OWNER = 'BLOG'"
        );
        assert_eq!(d.table_exists("posts", Some("")), d.table_exists("posts", None));
    }

    #[test]
    fn test_list_tables() {
        let d = OracleDialect::new();
        assert_eq!(
            d.list_tables(None),
            "SELECT TABLE_NAME, OWNER FROM ALL_TABLES ORDER BY OWNER, TABLE_NAME"
        );
        assert_eq!(
            d.list_tables(Some("blog")),
            "SELECT TABLE_NAME, OWNER FROM ALL_TABLES WHERE OWNER = 'BLOG' ORDER BY OWNER, TABLE_NAME"
        );
    }

    #[test]
    fn test_views() {
        let d = OracleDialect::new();
        assert_eq!(d.list_views(None), "SELECT VIEW_NAME FROM ALL_VIEWS ORDER BY VIEW_NAME");
        assert_eq!(
            d.list_views(Some("blog")),
            "SELECT VIEW_NAME FROM ALL_VIEWS WHERE OWNER = 'BLOG' ORDER BY VIEW_NAME"
        );
        assert_eq!(
            d.view_exists("recent", Some("blog")),
            "SELECT CASE WHEN COUNT(*)>0 THEN 1 ELSE 0 END RET FROM ALL_VIEWS \
             WHERE VIEW_NAME = 'RECENT' AND OWNER = 'BLOG'"
        );
    }

    #[test]
    fn test_describe_columns() {
        let d = OracleDialect::new();
        assert_eq!(
            d.describe_columns("posts", Some("blog")),
            "SELECT TC.COLUMN_NAME, TC.DATA_TYPE, TC.DATA_LENGTH, TC.DATA_PRECISION, TC.DATA_SCALE, \
             TC.NULLABLE, C.CONSTRAINT_TYPE, TC.DATA_DEFAULT, CC.POSITION FROM ALL_TAB_COLUMNS TC \
             LEFT JOIN (ALL_CONS_COLUMNS CC JOIN ALL_CONSTRAINTS C ON CC.CONSTRAINT_NAME=C.CONSTRAINT_NAME \
             AND CC.TABLE_NAME=C.TABLE_NAME AND CC.OWNER=C.OWNER AND C.CONSTRAINT_TYPE='P') \
             ON TC.TABLE_NAME=CC.TABLE_NAME AND TC.COLUMN_NAME=CC.COLUMN_NAME \
             WHERE TC.TABLE_NAME='POSTS' AND TC.OWNER='BLOG' ORDER BY TC.COLUMN_ID"
        );
        assert!(d.describe_columns("posts", None).ends_with("WHERE TC.TABLE_NAME='POSTS' ORDER BY TC.COLUMN_ID"));
    }

    #[test]
    fn test_describe_indexes_and_references() {
        let d = OracleDialect::new();
        let sql = d.describe_indexes("posts", Some("blog"));
        assert!(sql.starts_with("SELECT I.TABLE_NAME, 0 AS C0, I.INDEX_NAME, IC.COLUMN_POSITION, IC.COLUMN_NAME, I.OWNER "));
        assert!(sql.contains("WHERE I.TABLE_NAME = 'POSTS' AND IC.INDEX_OWNER = 'BLOG'"));
        assert!(sql.ends_with("ORDER BY I.OWNER, I.INDEX_NAME, IC.COLUMN_POSITION"));

        let sql = d.describe_references("posts", None);
        assert!(sql.contains("WHERE AC.CONSTRAINT_TYPE = 'R' AND AC.TABLE_NAME = 'POSTS'"));
        let sql = d.describe_references("posts", Some("blog"));
        assert!(sql.contains("AND AC.OWNER = 'BLOG' AND AC.TABLE_NAME = 'POSTS'"));
    }

    #[test]
    fn test_drop_table() {
        let d = OracleDialect::new();
        assert_eq!(d.drop_table("posts", Some("blog"), false), "DROP TABLE blog.posts");
        assert_eq!(
            d.drop_table("posts", None, true),
            "BEGIN EXECUTE IMMEDIATE 'DROP TABLE posts'; EXCEPTION WHEN OTHERS THEN \
             IF SQLCODE != -942 THEN RAISE; END IF; END;"
        );
    }

    #[test]
    fn test_views_ddl() {
        let d = OracleDialect::new();
        assert_eq!(
            d.create_view("recent", &ViewDefinition::new("SELECT * FROM posts"), Some("blog"))
                .unwrap(),
            "CREATE VIEW BLOG.RECENT AS SELECT * FROM posts"
        );
        let err = d.create_view("recent", &ViewDefinition::default(), None).unwrap_err();
        assert!(matches!(err, DialectError::InvalidDefinition(_)));

        assert_eq!(d.drop_view("recent", None, false), "DROP VIEW RECENT");
        assert_eq!(
            d.drop_view("recent", Some("blog"), true),
            "BEGIN FOR i IN (SELECT NULL FROM ALL_VIEWS WHERE VIEW_NAME = 'RECENT' AND OWNER = 'BLOG') \
             LOOP EXECUTE IMMEDIATE 'DROP VIEW BLOG.RECENT'; END LOOP; END;"
        );
    }

    #[test]
    fn test_create_view_never_uses_string_quotes() {
        let sql = ViewDefinition::new("SELECT 1 FROM DUAL");

        let d = OracleDialect::with_quote(QuotePolicy::Literal);
        assert_eq!(
            d.create_view("recent", &sql, Some("blog")).unwrap(),
            "CREATE VIEW BLOG.RECENT AS SELECT 1 FROM DUAL"
        );
        assert_eq!(d.drop_view("recent", Some("blog"), false), "DROP VIEW BLOG.RECENT");

        let d = OracleDialect::with_quote(QuotePolicy::Identifier);
        assert_eq!(
            d.create_view("recent", &sql, Some("blog")).unwrap(),
            "CREATE VIEW \"BLOG\".\"RECENT\" AS SELECT 1 FROM DUAL"
        );
    }

    #[test]
    fn test_unsupported_ddl() {
        let d = OracleDialect::new();
        let column = Column::of_type("title", ColumnDefinition::new(ColumnType::Varchar).size(Some(10)));
        let index = Index {
            table: "posts".into(),
            schema: None,
            name: "posts_title".into(),
            columns: vec!["title".into()],
        };

        assert!(d.add_column("posts", None, &column).unwrap_err().is_unsupported());
        assert!(d.modify_column("posts", None, &column, None).unwrap_err().is_unsupported());
        assert!(d.drop_column("posts", None, "title").unwrap_err().is_unsupported());
        assert!(d.add_index("posts", None, &index).unwrap_err().is_unsupported());
        assert!(d.drop_index("posts", None, "posts_title").unwrap_err().is_unsupported());
        assert!(d.add_primary_key("posts", None, &index).unwrap_err().is_unsupported());
        assert!(d.drop_primary_key("posts", None).unwrap_err().is_unsupported());
        assert!(d.drop_foreign_key("posts", None, "fk").unwrap_err().is_unsupported());
        assert!(d.create_table("posts", None, &[column]).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_capabilities() {
        let d = OracleDialect::new();
        assert!(d.supports(DdlOperation::DropTable));
        assert!(d.supports(DdlOperation::CreateView));
        assert!(!d.supports(DdlOperation::AddForeignKey));

        let reference = Reference {
            table: "posts".into(),
            name: "fk_author".into(),
            columns: vec!["author_id".into()],
            referenced_schema: None,
            referenced_table: "authors".into(),
            referenced_columns: vec!["id".into()],
        };
        let plan = d
            .plan(&DdlRequest::AddForeignKey {
                table: "posts",
                schema: None,
                reference: &reference,
            })
            .unwrap();
        assert_eq!(plan, Capability::Unsupported(DdlOperation::AddForeignKey));

        let plan = d
            .plan(&DdlRequest::DropTable {
                table: "posts",
                schema: None,
                if_exists: false,
            })
            .unwrap();
        assert_eq!(plan, Capability::Supported("DROP TABLE posts".into()));

        let definition = ViewDefinition::default();
        let err = d
            .plan(&DdlRequest::CreateView {
                view: "v",
                schema: None,
                definition: &definition,
            })
            .unwrap_err();
        assert!(matches!(err, DialectError::InvalidDefinition(_)));
    }

    #[test]
    fn test_quote_policy_unchanged_by_builders() {
        let d = OracleDialect::with_quote(QuotePolicy::Identifier);
        let _ = d.table_exists("posts", Some("blog"));
        let _ = d.describe_columns("posts", Some("blog"));
        let _ = d.drop_table("posts", None, true);
        assert_eq!(d.quote_policy(), QuotePolicy::Identifier);
        assert_eq!(d.escape("posts", None), "\"posts\"");
    }

    #[test]
    fn test_misc_clauses() {
        let d = OracleDialect::new();
        assert_eq!(d.quote_identifier("my\"col"), "\"my\"\"col\"");
        assert_eq!(d.placeholder(2), ":2");
        assert_eq!(d.bool_literal(true), "1");
        assert_eq!(d.shared_lock("SELECT 1 FROM DUAL"), "SELECT 1 FROM DUAL LOCK IN SHARE MODE");
        assert_eq!(d.for_update("SELECT 1 FROM DUAL"), "SELECT 1 FROM DUAL FOR UPDATE");
        assert_eq!(d.table_options("posts", None), "");
        assert!(!d.supports_savepoints());
        assert!(!d.supports_release_savepoints());
        assert_eq!(
            d.limit("SELECT 1 FROM DUAL", LimitSpec::Limit(1)),
            "SELECT * FROM (SELECT Z1.*, ROWNUM ORD FROM (SELECT 1 FROM DUAL) Z1 WHERE ROWNUM <= 1) WHERE ORD >= 0"
        );
    }
}
