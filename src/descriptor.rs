//! Connection descriptors.
//!
//! A descriptor names the database, the credentials, and an optional list of
//! `startup` statements run right after the connection opens. The `dbname`
//! may be an Easy Connect address:
//!
//! ```text
//! //db.example.com:1521/enigma
//! ──┬ ───────┬────── ─┬── ──┬──
//!   │        │        │     └── service name (optional)
//!   │        │        └── port (optional, default 1521)
//!   │        └── host, or [ipv6]
//!   └── optional prefix
//! ```

use std::fmt;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1},
    combinator::{map_res, opt},
    sequence::{delimited, preceded},
};
use serde::{Deserialize, Serialize};

use crate::error::{DialectError, DialectResult};

/// Default listener port.
pub const DEFAULT_PORT: u16 = 1521;

/// Statements executed right after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Startup {
    One(String),
    Many(Vec<String>),
}

impl Startup {
    /// Statements in execution order.
    pub fn statements(&self) -> Vec<&str> {
        match self {
            Startup::One(sql) => vec![sql.as_str()],
            Startup::Many(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Startup {
    fn from(sql: &str) -> Self {
        Startup::One(sql.to_string())
    }
}

impl From<Vec<String>> for Startup {
    fn from(list: Vec<String>) -> Self {
        Startup::Many(list)
    }
}

/// Everything needed to open a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub dbname: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub startup: Option<Startup>,
}

impl ConnectionDescriptor {
    pub fn new(dbname: impl Into<String>) -> Self {
        Self {
            dbname: dbname.into(),
            ..Self::default()
        }
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn startup(mut self, startup: impl Into<Startup>) -> Self {
        self.startup = Some(startup.into());
        self
    }

    /// Startup statements, empty when none are configured.
    pub fn startup_statements(&self) -> Vec<&str> {
        self.startup.as_ref().map(Startup::statements).unwrap_or_default()
    }

    /// Parse `dbname` as an Easy Connect address.
    pub fn address(&self) -> DialectResult<EasyConnect> {
        EasyConnect::parse(&self.dbname)
    }

    /// Where this descriptor points, for logs and status output. Easy Connect
    /// addresses are normalized with the default port filled in; anything
    /// else (TNS aliases with options, full connect descriptors) is shown as
    /// written.
    pub fn target(&self) -> String {
        match self.address() {
            Ok(addr) => addr.to_string(),
            Err(_) => self.dbname.trim().to_string(),
        }
    }
}

/// `[//]host[:port][/service]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EasyConnect {
    pub host: String,
    pub port: u16,
    pub service: Option<String>,
}

impl EasyConnect {
    pub fn parse(input: &str) -> DialectResult<Self> {
        let input = input.trim();

        match parse_easy_connect(input) {
            Ok(("", addr)) => Ok(addr),
            Ok((remaining, _)) => Err(DialectError::parse(
                input.len() - remaining.len(),
                format!("Unexpected trailing content: '{}'", remaining),
            )),
            Err(e) => Err(DialectError::parse(0, format!("Invalid connect address: {:?}", e))),
        }
    }
}

impl fmt::Display for EasyConnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "//[{}]:{}", self.host, self.port)?;
        } else {
            write!(f, "//{}:{}", self.host, self.port)?;
        }
        if let Some(service) = &self.service {
            write!(f, "/{}", service)?;
        }
        Ok(())
    }
}

fn parse_easy_connect(input: &str) -> IResult<&str, EasyConnect> {
    let (input, _) = opt(tag("//"))(input)?;
    let (input, host) = parse_host(input)?;
    let (input, port) = opt(preceded(char(':'), parse_port))(input)?;
    let (input, service) = opt(preceded(char('/'), parse_service))(input)?;

    Ok((
        input,
        EasyConnect {
            host: host.to_string(),
            port: port.unwrap_or(DEFAULT_PORT),
            service: service.map(str::to_string),
        },
    ))
}

/// Host name, IPv4 address, or bracketed IPv6 address.
fn parse_host(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('['), take_while1(|c: char| c.is_ascii_hexdigit() || c == ':'), char(']')),
        take_while1(|c: char| c.is_alphanumeric() || c == '.' || c == '-' || c == '_'),
    ))(input)
}

fn parse_port(input: &str) -> IResult<&str, u16> {
    map_res(digit1, str::parse::<u16>)(input)
}

fn parse_service(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || "_.-$#".contains(c))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_address() {
        let addr = EasyConnect::parse("//db.example.com:1522/enigma").unwrap();
        assert_eq!(addr.host, "db.example.com");
        assert_eq!(addr.port, 1522);
        assert_eq!(addr.service.as_deref(), Some("enigma"));
        assert_eq!(addr.to_string(), "//db.example.com:1522/enigma");
    }

    #[test]
    fn test_parse_defaults() {
        let addr = EasyConnect::parse("//localhost/enigma").unwrap();
        assert_eq!(addr.port, DEFAULT_PORT);

        let addr = EasyConnect::parse("localhost").unwrap();
        assert_eq!(addr.service, None);
        assert_eq!(addr.to_string(), "//localhost:1521");
    }

    #[test]
    fn test_parse_ipv6() {
        let addr = EasyConnect::parse("//[::1]:1521/XEPDB1").unwrap();
        assert_eq!(addr.host, "::1");
        assert_eq!(addr.to_string(), "//[::1]:1521/XEPDB1");
    }

    #[test]
    fn test_parse_errors() {
        let err = EasyConnect::parse("//localhost:99999/x").unwrap_err();
        assert!(matches!(err, DialectError::Parse { .. }));

        let err = EasyConnect::parse("//localhost/enigma extra").unwrap_err();
        match err {
            DialectError::Parse { position, .. } => assert_eq!(position, 18),
            other => panic!("unexpected error: {other}"),
        }

        assert!(EasyConnect::parse("").is_err());
    }

    #[test]
    fn test_startup_forms() {
        let single = ConnectionDescriptor::new("//localhost/enigma").startup("ALTER SESSION SET NLS_SORT = BINARY");
        assert_eq!(single.startup_statements(), vec!["ALTER SESSION SET NLS_SORT = BINARY"]);

        let none = ConnectionDescriptor::new("//localhost/enigma");
        assert!(none.startup_statements().is_empty());
    }

    #[test]
    fn test_target() {
        assert_eq!(ConnectionDescriptor::new("localhost/enigma").target(), "//localhost:1521/enigma");
        assert_eq!(
            ConnectionDescriptor::new("//[::1]:1522/XEPDB1").target(),
            "//[::1]:1522/XEPDB1"
        );

        let full = "(DESCRIPTION=(ADDRESS=(PROTOCOL=TCP)(HOST=db)(PORT=1521))(CONNECT_DATA=(SERVICE_NAME=enigma)))";
        assert_eq!(ConnectionDescriptor::new(full).target(), full);
    }

    #[test]
    fn test_descriptor_deserialize() {
        let one: ConnectionDescriptor = serde_json::from_str(
            r#"{"dbname": "//localhost/enigma", "username": "oracle", "startup": "SELECT 1 FROM DUAL"}"#,
        )
        .unwrap();
        assert_eq!(one.startup, Some(Startup::One("SELECT 1 FROM DUAL".into())));

        let many: ConnectionDescriptor =
            serde_json::from_str(r#"{"dbname": "x", "startup": ["A", "B"]}"#).unwrap();
        assert_eq!(many.startup_statements(), vec!["A", "B"]);
    }
}
