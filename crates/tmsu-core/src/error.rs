use std::path::PathBuf;

use thiserror::Error;

use crate::version::SchemaVersion;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no database found at '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("could not access database '{path}': {source}")]
    Access {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("could not {operation} transaction on '{path}': {source}")]
    Transaction {
        operation: &'static str,
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{what}: expected exactly one row to be affected but {affected} were")]
    Constraint { what: &'static str, affected: u64 },

    #[error("schema migration failed at '{step}': {source}")]
    Migration {
        step: String,
        #[source]
        source: Box<Error>,
    },

    #[error("database schema {stored} is newer than the latest supported schema {latest}")]
    UnsupportedVersion {
        stored: SchemaVersion,
        latest: SchemaVersion,
    },

    #[error("could not decode column {column}: {reason}")]
    Decode { column: usize, reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("MySQL error: {0}")]
    MySql(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn access(path: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Access {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn migration(step: impl Into<String>, source: Self) -> Self {
        Self::Migration {
            step: step.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
