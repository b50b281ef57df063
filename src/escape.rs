//! Identifier and literal escaping.
//!
//! Quoting is always an explicit per-call choice. A dialect carries a default
//! [`QuotePolicy`] fixed at construction; builders that need another policy
//! for a sub-step pass it in rather than flipping shared state, so one
//! dialect value can be shared freely between callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DialectError;

/// How a value is wrapped before it is embedded in SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotePolicy {
    /// Emit the value untouched (DDL identifier positions).
    #[default]
    Bare,
    /// Single-quoted string literal.
    Literal,
    /// Double-quoted, case-sensitive identifier.
    Identifier,
}

impl QuotePolicy {
    pub fn quote_char(self) -> Option<char> {
        match self {
            QuotePolicy::Bare => None,
            QuotePolicy::Literal => Some('\''),
            QuotePolicy::Identifier => Some('"'),
        }
    }
}

impl fmt::Display for QuotePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuotePolicy::Bare => "bare",
            QuotePolicy::Literal => "literal",
            QuotePolicy::Identifier => "identifier",
        };
        f.write_str(name)
    }
}

impl FromStr for QuotePolicy {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bare" | "none" | "" => Ok(QuotePolicy::Bare),
            "literal" | "'" => Ok(QuotePolicy::Literal),
            "identifier" | "\"" => Ok(QuotePolicy::Identifier),
            other => Err(DialectError::Config(format!(
                "unknown quote policy '{}', expected bare, literal or identifier",
                other
            ))),
        }
    }
}

/// How the engine folds unquoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFolding {
    #[default]
    Upper,
    Lower,
    Preserve,
}

impl CaseFolding {
    pub fn apply(self, name: &str) -> String {
        match self {
            CaseFolding::Upper => name.to_uppercase(),
            CaseFolding::Lower => name.to_lowercase(),
            CaseFolding::Preserve => name.to_string(),
        }
    }
}

/// Wrap `value` in the quote character of `policy`, doubling any embedded
/// quote. Identifiers are quoted one dot-separated part at a time so that
/// `blog.posts` becomes `"blog"."posts"`.
pub fn escape(value: &str, policy: QuotePolicy) -> String {
    match policy {
        QuotePolicy::Bare => value.to_string(),
        QuotePolicy::Literal => wrap(value, '\''),
        QuotePolicy::Identifier => value
            .split('.')
            .map(|part| wrap(part, '"'))
            .collect::<Vec<_>>()
            .join("."),
    }
}

/// Escape a schema/owner name. Pre-existing quote characters around the name
/// are stripped first and the name is never split on dots.
pub fn escape_schema(value: &str, policy: QuotePolicy) -> String {
    match policy.quote_char() {
        None => value.to_string(),
        Some(q) => wrap(value.trim_matches(q), q),
    }
}

fn wrap(value: &str, quote: char) -> String {
    let doubled: String = [quote, quote].iter().collect();
    format!("{quote}{}{quote}", value.replace(quote, &doubled))
}

/// Cross-cutting identifier helpers composed into every dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentifierRules {
    pub folding: CaseFolding,
    pub default_quote: QuotePolicy,
}

impl IdentifierRules {
    pub fn new(folding: CaseFolding, default_quote: QuotePolicy) -> Self {
        Self {
            folding,
            default_quote,
        }
    }

    /// Fold a name the way the catalog stores unquoted identifiers.
    pub fn fold(&self, name: &str) -> String {
        self.folding.apply(name)
    }

    /// Escape with an explicit policy, or the configured default.
    pub fn escape(&self, value: &str, policy: Option<QuotePolicy>) -> String {
        escape(value, policy.unwrap_or(self.default_quote))
    }

    pub fn escape_schema(&self, value: &str, policy: Option<QuotePolicy>) -> String {
        escape_schema(value, policy.unwrap_or(self.default_quote))
    }

    /// A folded, single-quoted name ready to compare against catalog columns.
    pub fn catalog_literal(&self, name: &str) -> String {
        escape(&self.fold(name), QuotePolicy::Literal)
    }

    /// `schema.table alias` with each part escaped under `policy`.
    pub fn prepare_table(
        &self,
        table: &str,
        schema: Option<&str>,
        alias: Option<&str>,
        policy: Option<QuotePolicy>,
    ) -> String {
        let mut sql = self.escape(table, policy);

        if let Some(schema) = schema.filter(|s| !s.is_empty()) {
            sql = format!("{}.{}", self.escape_schema(schema, policy), sql);
        }

        if let Some(alias) = alias.filter(|a| !a.is_empty()) {
            sql.push(' ');
            sql.push_str(&self.escape(alias, policy));
        }

        sql
    }
}
