//! # oradialect
//!
//! Oracle SQL dialect: identifier escaping, row limiting, type mapping,
//! catalog introspection queries, and the small set of DDL statements the
//! engine supports natively.
//!
//! ## Quick Example
//!
//! ```
//! use oradialect::prelude::*;
//!
//! let dialect = OracleDialect::new();
//!
//! let sql = dialect.limit("SELECT * FROM posts ORDER BY id", LimitSpec::from((10u64, 20u64)));
//! assert!(sql.contains("ROWNUM <= 30"));
//!
//! let sql = dialect.table_exists("posts", Some("blog"));
//! assert!(sql.ends_with("WHERE TABLE_NAME = 'POSTS' AND OWNER = 'BLOG'"));
//! ```
//!
//! ## Layout
//!
//! | Module        | Role                                           |
//! |---------------|------------------------------------------------|
//! | `dialect`     | SQL text generation (`SqlDialect`)             |
//! | `adapter`     | Runs catalog SQL, rebuilds descriptors         |
//! | `typemap`     | Native type <-> abstract type                  |
//! | `pagination`  | `ROWNUM` windowing                             |
//! | `escape`      | Quoting policies and case folding              |
//! | `connection`  | The collaborator a driver implements           |

pub mod adapter;
pub mod config;
pub mod connection;
pub mod descriptor;
pub mod dialect;
pub mod error;
pub mod escape;
pub mod pagination;
pub mod typemap;
pub mod types;

pub mod prelude {
    pub use crate::adapter::OracleAdapter;
    pub use crate::config::Config;
    pub use crate::connection::{Connection, Connector, ExecutionError, Row, Value};
    pub use crate::descriptor::{ConnectionDescriptor, EasyConnect, Startup};
    pub use crate::dialect::{
        Capability, DdlOperation, DdlRequest, OracleDialect, SqlDialect, ViewDefinition,
    };
    pub use crate::error::*;
    pub use crate::escape::{CaseFolding, IdentifierRules, QuotePolicy};
    pub use crate::pagination::LimitSpec;
    pub use crate::typemap::CatalogSize;
    pub use crate::types::*;
}

/// Wrap `sql` in the `ROWNUM` window for `spec`.
///
/// # Example
///
/// ```
/// let sql = oradialect::limit("SELECT ID FROM POSTS", 5u64);
/// assert_eq!(
///     sql,
///     "SELECT * FROM (SELECT Z1.*, ROWNUM ORD FROM (SELECT ID FROM POSTS) Z1 WHERE ROWNUM <= 5) WHERE ORD >= 0"
/// );
/// ```
pub fn limit(sql: &str, spec: impl Into<pagination::LimitSpec>) -> String {
    pagination::apply_limit(sql, spec)
}
