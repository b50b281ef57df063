//! LIMIT/OFFSET emulation on top of `ROWNUM`.
//!
//! The inner query is wrapped twice: the first wrapper numbers rows and cuts
//! at `offset + limit`, the outer one drops everything before `offset`. The
//! lower bound is emitted even when the offset is zero.

use serde::{Deserialize, Serialize};

/// Row-limiting request: either a bare limit or a `(limit, offset)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LimitSpec {
    Limit(u64),
    LimitOffset(u64, u64),
}

impl LimitSpec {
    pub fn limit(&self) -> u64 {
        match *self {
            LimitSpec::Limit(limit) | LimitSpec::LimitOffset(limit, _) => limit,
        }
    }

    pub fn offset(&self) -> u64 {
        match *self {
            LimitSpec::Limit(_) => 0,
            LimitSpec::LimitOffset(_, offset) => offset,
        }
    }

    /// Last ordinal kept by the first wrapper.
    pub fn upper_bound(&self) -> u64 {
        self.offset().saturating_add(self.limit())
    }
}

impl From<u64> for LimitSpec {
    fn from(limit: u64) -> Self {
        LimitSpec::Limit(limit)
    }
}

impl From<(u64, u64)> for LimitSpec {
    fn from((limit, offset): (u64, u64)) -> Self {
        LimitSpec::LimitOffset(limit, offset)
    }
}

impl From<[u64; 2]> for LimitSpec {
    fn from([limit, offset]: [u64; 2]) -> Self {
        LimitSpec::LimitOffset(limit, offset)
    }
}

/// Synthetic ordinal column name; never part of the projected result.
pub const ORDINAL_COLUMN: &str = "ORD";

/// Wrap `sql` so that it returns at most `limit` rows starting at `offset`.
pub fn apply_limit(sql: &str, spec: impl Into<LimitSpec>) -> String {
    let spec = spec.into();
    format!(
        "SELECT * FROM (SELECT Z1.*, ROWNUM {ord} FROM ({}) Z1 WHERE ROWNUM <= {}) WHERE {ord} >= {}",
        sql,
        spec.upper_bound(),
        spec.offset(),
        ord = ORDINAL_COLUMN,
    )
}
