//! Configuration file loading.
//!
//! Looked up in order: an explicit path, `./oradialect.toml`, then
//! `<config dir>/oradialect/config.toml`. A missing file is not an error;
//! a malformed one is.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::ConnectionDescriptor;
use crate::dialect::OracleDialect;
use crate::error::{DialectError, DialectResult};
use crate::escape::QuotePolicy;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "oradialect.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectSettings {
    /// Default quoting for `escape` calls that pass no explicit policy.
    pub quote: QuotePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: Option<ConnectionDescriptor>,
    pub dialect: DialectSettings,
}

impl Config {
    pub fn from_toml(content: &str) -> DialectResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> DialectResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from `explicit` if given (it must exist), otherwise from the
    /// first file found on the search path, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> DialectResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(DialectError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            debug!("Loading config from {}", path.display());
            return Self::from_file(path);
        }

        match search_path().into_iter().find(|p| p.exists()) {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// A dialect configured with these settings.
    pub fn dialect(&self) -> OracleDialect {
        OracleDialect::with_quote(self.dialect.quote)
    }

    /// The connection descriptor, or a configuration error when absent.
    pub fn connection(&self) -> DialectResult<&ConnectionDescriptor> {
        self.connection
            .as_ref()
            .ok_or_else(|| DialectError::Config("no [connection] section configured".to_string()))
    }
}

/// Candidate config files, most specific first.
pub fn search_path() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("oradialect").join("config.toml"));
    }
    paths
}
