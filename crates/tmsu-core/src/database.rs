use std::path::Path;

use crate::dialect;
use crate::driver::sqlite::SqliteSession;
use crate::driver::{BackendKind, Registry, Session};
use crate::error::{Error, Result};
use crate::path::has_scheme;
use crate::upgrade;
use crate::value::{Row, SqlValue};

/// An open connection to a tag database.
pub struct Database {
    path: String,
    kind: BackendKind,
    session: Box<dyn Session>,
}

impl Database {
    /// Creates (or brings up to date) the database at `path`.
    ///
    /// The connection is closed again before returning.
    pub fn create_at(registry: &Registry, path: &str) -> Result<()> {
        tracing::info!("creating database at '{path}'");
        let mut db = Self::connect(registry, path)?;
        db.upgrade()
    }

    /// Opens an existing database, upgrading its schema when needed.
    ///
    /// A plain filesystem path that does not exist is reported as
    /// [`Error::NotFound`] rather than silently creating an empty store.
    pub fn open_at(registry: &Registry, path: &str) -> Result<Self> {
        tracing::info!("opening database at '{path}'");

        if !has_scheme(path) {
            match Path::new(path).try_exists() {
                Ok(true) => {}
                Ok(false) => return Err(Error::NotFound(path.into())),
                Err(e) => return Err(Error::access(path, e)),
            }
        }

        let mut db = Self::connect(registry, path)?;
        db.upgrade()?;
        Ok(db)
    }

    /// A private, schema-initialised SQLite database that lives only as long
    /// as the returned value.
    pub fn open_in_memory() -> Result<Self> {
        let session = SqliteSession::open_in_memory()?;
        let mut db = Self::with_session(":memory:", BackendKind::Sqlite, Box::new(session));
        db.upgrade()?;
        Ok(db)
    }

    pub(crate) fn with_session(
        path: impl Into<String>,
        kind: BackendKind,
        session: Box<dyn Session>,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            session,
        }
    }

    fn connect(registry: &Registry, path: &str) -> Result<Self> {
        let (kind, session) = registry.connect(path)?;
        Ok(Self::with_session(path, kind, session))
    }

    fn upgrade(&mut self) -> Result<()> {
        let mut tx = self.begin()?;
        upgrade::upgrade(&mut tx)?;
        tx.commit()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Starts a transaction. The returned [`Tx`] borrows the database
    /// mutably, so only one can be open at a time.
    pub fn begin(&mut self) -> Result<Tx<'_>> {
        self.session
            .begin()
            .map_err(|e| transaction_error("begin", &self.path, e))?;
        Ok(Tx {
            db: self,
            finished: false,
        })
    }

    pub fn close(self) {
        tracing::debug!("closing database '{}'", self.path);
    }
}

fn transaction_error(operation: &'static str, path: &str, source: Error) -> Error {
    Error::Transaction {
        operation,
        path: path.to_string(),
        source: Box::new(source),
    }
}

/// A transaction on a [`Database`].
///
/// Statements are written in the SQLite dialect and translated for the
/// connection's backend before they are sent. A `Tx` dropped without
/// [`commit`](Tx::commit) or [`rollback`](Tx::rollback) is rolled back.
pub struct Tx<'db> {
    db: &'db mut Database,
    finished: bool,
}

impl Tx<'_> {
    pub const fn kind(&self) -> BackendKind {
        self.db.kind
    }

    pub fn path(&self) -> &str {
        &self.db.path
    }

    /// Executes a statement and returns the number of rows it changed.
    pub fn execute(&mut self, sql: &str, args: &[SqlValue]) -> Result<u64> {
        let sql = dialect::translate(self.db.kind, sql);
        log_statement(&sql, args);
        self.db.session.execute(&sql, args)
    }

    pub fn query(&mut self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>> {
        let sql = dialect::translate(self.db.kind, sql);
        log_statement(&sql, args);
        self.db.session.query(&sql, args)
    }

    /// First row of a query, if any.
    pub fn query_row(&mut self, sql: &str, args: &[SqlValue]) -> Result<Option<Row>> {
        Ok(self.query(sql, args)?.into_iter().next())
    }

    pub fn count(&mut self, table: &str, column: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT({column}) FROM {table}");
        self.scalar(&sql, &[])
    }

    /// One past the largest `column` in `table`, or 1 when the table is
    /// empty. Needed where the backend does not assign ids itself.
    pub fn next_id(&mut self, table: &str, column: &str) -> Result<u64> {
        let sql = format!("SELECT MAX({column}) FROM {table}");
        let row = self.query_row(&sql, &[])?;
        let last = match row {
            Some(row) => row.get::<Option<u64>>(0)?,
            None => None,
        };
        Ok(last.map_or(1, |id| id + 1))
    }

    pub fn table_exists(&mut self, name: &str) -> Result<bool> {
        let sql = dialect::table_exists_sql(self.db.kind);
        Ok(self.scalar(sql, &[name.into()])? > 0)
    }

    pub fn index_exists(&mut self, name: &str) -> Result<bool> {
        let sql = dialect::index_exists_sql(self.db.kind);
        Ok(self.scalar(sql, &[name.into()])? > 0)
    }

    pub fn column_exists(&mut self, table: &str, column: &str) -> Result<bool> {
        let sql = dialect::column_exists_sql(self.db.kind);
        Ok(self.scalar(sql, &[table.into(), column.into()])? > 0)
    }

    fn scalar(&mut self, sql: &str, args: &[SqlValue]) -> Result<u64> {
        match self.query_row(sql, args)? {
            Some(row) => row.get(0),
            None => Err(Error::Decode {
                column: 0,
                reason: "query returned no rows".to_string(),
            }),
        }
    }

    pub fn commit(mut self) -> Result<()> {
        tracing::debug!("committing transaction");
        // on failure the transaction is still open and Drop rolls it back
        self.db
            .session
            .commit()
            .map_err(|e| transaction_error("commit", &self.db.path, e))?;
        self.finished = true;
        Ok(())
    }

    pub fn rollback(mut self) -> Result<()> {
        tracing::debug!("rolling back transaction");
        self.finished = true;
        self.db
            .session
            .rollback()
            .map_err(|e| transaction_error("roll back", &self.db.path, e))
    }
}

impl Drop for Tx<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::debug!("rolling back unfinished transaction");
        if let Err(e) = self.db.session.rollback() {
            tracing::warn!("could not roll back transaction on '{}': {e}", self.db.path);
        }
    }
}

fn log_statement(sql: &str, args: &[SqlValue]) {
    tracing::trace!("{sql}");
    if !args.is_empty() {
        let params: Vec<String> = args.iter().map(ToString::to_string).collect();
        tracing::trace!("params: [{}]", params.join(", "));
    }
}
