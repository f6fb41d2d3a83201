//! Drivers and the scheme registry used to open connections.

pub mod mysql;
pub mod sqlite;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::path::Location;
use crate::value::{Row, SqlValue};

/// The engine family behind a connection. Decided when the connection is
/// opened and used to pick dialect rules and catalog queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Sqlite,
    MySql,
}

impl BackendKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite3",
            Self::MySql => "mysql",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single physical connection. Statements arrive already translated for
/// the session's dialect.
pub trait Session {
    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
    fn execute(&mut self, sql: &str, args: &[SqlValue]) -> Result<u64>;
    fn query(&mut self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>>;
}

pub type Opener = Box<dyn Fn(&str) -> Result<Box<dyn Session>> + Send + Sync>;

struct Driver {
    kind: BackendKind,
    open: Opener,
}

/// Scheme to driver map. Built once at start-up and handed to
/// [`Database`](crate::Database) so which backends exist is explicit.
pub struct Registry {
    drivers: HashMap<String, Driver>,
}

impl Registry {
    /// A registry with no networked drivers; scheme-less paths still open
    /// the embedded engine.
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, scheme: impl Into<String>, kind: BackendKind, open: F)
    where
        F: Fn(&str) -> Result<Box<dyn Session>> + Send + Sync + 'static,
    {
        self.drivers.insert(
            scheme.into(),
            Driver {
                kind,
                open: Box::new(open),
            },
        );
    }

    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.drivers.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Opens a session for `path`, choosing the driver by scheme.
    pub fn connect(&self, path: &str) -> Result<(BackendKind, Box<dyn Session>)> {
        match Location::parse(path) {
            Location::Embedded(file) => {
                let session = open_embedded(&file).map_err(|e| Error::access(path, e))?;
                Ok((BackendKind::Sqlite, session))
            }
            Location::Networked { scheme, address } => {
                let driver = self.drivers.get(&scheme).ok_or_else(|| {
                    Error::access(path, format!("no driver registered for scheme '{scheme}'"))
                })?;
                let session = (driver.open)(&address).map_err(|e| Error::access(path, e))?;
                Ok((driver.kind, session))
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register("sqlite3", BackendKind::Sqlite, |address| {
            open_embedded(Path::new(address))
        });
        registry.register("mysql", BackendKind::MySql, |address| {
            Ok(Box::new(mysql::MySqlSession::connect(address)?) as Box<dyn Session>)
        });
        registry
    }
}

fn open_embedded(path: &Path) -> Result<Box<dyn Session>> {
    Ok(Box::new(sqlite::SqliteSession::open(path)?))
}
