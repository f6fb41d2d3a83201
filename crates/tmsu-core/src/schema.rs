//! Table and index definitions.
//!
//! `value` is always quoted: it is a reserved word in MySQL. Every step is
//! safe to repeat against an initialised store.

use crate::database::Tx;
use crate::error::{Error, Result};
use crate::version::{self, LATEST};

const TAG_TABLE: &str = "
CREATE TABLE IF NOT EXISTS tag (
    id INTEGER PRIMARY KEY,
    name VARCHAR(255) NOT NULL
)";

const FILE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS file (
    id INTEGER PRIMARY KEY,
    directory VARCHAR(255) NOT NULL,
    name VARCHAR(255) NOT NULL,
    fingerprint VARCHAR(255) NOT NULL,
    mod_time DATETIME NOT NULL,
    size INTEGER NOT NULL,
    is_dir BOOLEAN NOT NULL,
    CONSTRAINT con_file_path UNIQUE (directory, name)
)";

const VALUE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS `value` (
    id INTEGER PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    CONSTRAINT con_value_name UNIQUE (name)
)";

const FILE_TAG_TABLE: &str = "
CREATE TABLE IF NOT EXISTS file_tag (
    file_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    value_id INTEGER NOT NULL,
    PRIMARY KEY (file_id, tag_id, value_id),
    FOREIGN KEY (file_id) REFERENCES file(id),
    FOREIGN KEY (tag_id) REFERENCES tag(id),
    FOREIGN KEY (value_id) REFERENCES `value`(id)
)";

const IMPLICATION_TABLE: &str = "
CREATE TABLE IF NOT EXISTS implication (
    tag_id INTEGER NOT NULL,
    value_id INTEGER NOT NULL,
    implied_tag_id INTEGER NOT NULL,
    implied_value_id INTEGER NOT NULL,
    PRIMARY KEY (tag_id, value_id, implied_tag_id, implied_value_id)
)";

const QUERY_TABLE: &str = "
CREATE TABLE IF NOT EXISTS query (
    text VARCHAR(255) PRIMARY KEY
)";

const SETTING_TABLE: &str = "
CREATE TABLE IF NOT EXISTS setting (
    name VARCHAR(255) PRIMARY KEY,
    value VARCHAR(255) NOT NULL
)";

const VERSION_TABLE: &str = "
CREATE TABLE IF NOT EXISTS version (
    major INT NOT NULL,
    minor INT NOT NULL,
    patch INT NOT NULL,
    revision INT NOT NULL,
    PRIMARY KEY (major, minor, patch, revision)
)";

/// Tables in creation order; referenced tables come first.
pub const TABLES: &[(&str, &str)] = &[
    ("tag", TAG_TABLE),
    ("file", FILE_TABLE),
    ("value", VALUE_TABLE),
    ("file_tag", FILE_TAG_TABLE),
    ("implication", IMPLICATION_TABLE),
    ("query", QUERY_TABLE),
    ("setting", SETTING_TABLE),
    ("version", VERSION_TABLE),
];

pub struct Index {
    pub name: &'static str,
    pub table: &'static str,
    pub column: &'static str,
}

pub const INDEXES: &[Index] = &[
    Index {
        name: "idx_tag_name",
        table: "tag",
        column: "name",
    },
    Index {
        name: "idx_file_fingerprint",
        table: "file",
        column: "fingerprint",
    },
    Index {
        name: "idx_file_tag_file_id",
        table: "file_tag",
        column: "file_id",
    },
    Index {
        name: "idx_file_tag_tag_id",
        table: "file_tag",
        column: "tag_id",
    },
    Index {
        name: "idx_file_tag_value_id",
        table: "file_tag",
        column: "value_id",
    },
];

/// Id and name of the value row that stands for "no value".
pub const DEFAULT_VALUE: (i64, &str) = (0, "dummy");

/// Creates every table and index, seeds the sentinel value and stamps the
/// latest schema version.
pub fn create_schema(tx: &mut Tx<'_>) -> Result<()> {
    tracing::info!("creating schema {LATEST} on '{}'", tx.path());

    for (name, ddl) in TABLES {
        tx.execute(ddl, &[])
            .map_err(|e| Error::migration(format!("create table {name}"), e))?;
    }

    for index in INDEXES {
        create_index(tx, index)
            .map_err(|e| Error::migration(format!("create index {}", index.name), e))?;
    }

    insert_default_value(tx).map_err(|e| Error::migration("insert default value", e))?;
    stamp_version(tx).map_err(|e| Error::migration("record schema version", e))?;

    Ok(())
}

fn create_index(tx: &mut Tx<'_>, index: &Index) -> Result<()> {
    if tx.index_exists(index.name)? {
        return Ok(());
    }
    let sql = format!(
        "CREATE INDEX {} ON {}({})",
        index.name, index.table, index.column
    );
    tx.execute(&sql, &[])?;
    Ok(())
}

// Backends that enforce foreign keys need a row for associations that
// carry no value.
fn insert_default_value(tx: &mut Tx<'_>) -> Result<()> {
    let (id, name) = DEFAULT_VALUE;
    if tx.query_row("SELECT id FROM `value` WHERE id == ?1", &[id.into()])?.is_some() {
        return Ok(());
    }

    let affected = tx.execute(
        "INSERT INTO `value` (id, name) VALUES (?1, ?2)",
        &[id.into(), name.into()],
    )?;
    if affected != 1 {
        return Err(Error::Constraint {
            what: "default value could not be inserted",
            affected,
        });
    }
    Ok(())
}

fn stamp_version(tx: &mut Tx<'_>) -> Result<()> {
    if tx.count("version", "major")? == 0 {
        version::insert(tx, LATEST)
    } else {
        version::update(tx, LATEST).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::sqlite::SqliteSession;
    use crate::driver::BackendKind;
    use crate::Database;

    fn empty() -> Database {
        let session = SqliteSession::open_in_memory().unwrap();
        Database::with_session(":memory:", BackendKind::Sqlite, Box::new(session))
    }

    fn names(tx: &mut Tx<'_>, kind: &str) -> Vec<String> {
        tx.query(
            "SELECT name FROM sqlite_master WHERE type = ?1 ORDER BY name",
            &[kind.into()],
        )
        .unwrap()
        .iter()
        .map(|row| row.get(0).unwrap())
        .collect()
    }

    #[test]
    fn creates_all_tables() {
        let mut db = empty();
        let mut tx = db.begin().unwrap();
        create_schema(&mut tx).unwrap();

        let tables = names(&mut tx, "table");
        for (name, _) in TABLES {
            assert!(tables.contains(&(*name).to_string()), "missing table {name}");
        }
    }

    #[test]
    fn creates_all_indexes() {
        let mut db = empty();
        let mut tx = db.begin().unwrap();
        create_schema(&mut tx).unwrap();

        let indexes = names(&mut tx, "index");
        for index in INDEXES {
            assert!(indexes.contains(&index.name.to_string()), "missing index {}", index.name);
        }
    }

    #[test]
    fn seeds_default_value_and_version() {
        let mut db = empty();
        let mut tx = db.begin().unwrap();
        create_schema(&mut tx).unwrap();

        let row = tx
            .query_row("SELECT id, name FROM `value` WHERE id = 0", &[])
            .unwrap()
            .unwrap();
        assert_eq!(row.get::<String>(1).unwrap(), "dummy");
        assert_eq!(version::current(&mut tx).unwrap(), LATEST);
    }

    #[test]
    fn create_schema_is_idempotent() {
        let mut db = empty();
        let mut tx = db.begin().unwrap();
        create_schema(&mut tx).unwrap();
        create_schema(&mut tx).unwrap();

        assert_eq!(tx.count("version", "major").unwrap(), 1);
        let sentinel = tx
            .query("SELECT id FROM `value` WHERE id = 0", &[])
            .unwrap();
        assert_eq!(sentinel.len(), 1);
    }

    #[test]
    fn file_path_is_unique() {
        let mut db = empty();
        let mut tx = db.begin().unwrap();
        create_schema(&mut tx).unwrap();

        let insert = "INSERT INTO file (id, directory, name, fingerprint, mod_time, size, is_dir)
                      VALUES (?1, '/tmp', 'a', 'abc', '2024-01-01 00:00:00', 1, ?2)";
        tx.execute(insert, &[1.into(), false.into()]).unwrap();
        assert!(tx.execute(insert, &[2.into(), false.into()]).is_err());
    }

    #[test]
    fn file_tag_requires_existing_value() {
        let mut db = empty();
        let mut tx = db.begin().unwrap();
        create_schema(&mut tx).unwrap();

        tx.execute("INSERT INTO tag (id, name) VALUES (1, 'music')", &[])
            .unwrap();
        tx.execute(
            "INSERT INTO file (id, directory, name, fingerprint, mod_time, size, is_dir)
             VALUES (1, '/tmp', 'a.mp3', 'abc', '2024-01-01 00:00:00', 1, 0)",
            &[],
        )
        .unwrap();

        tx.execute("INSERT INTO file_tag VALUES (1, 1, 0)", &[])
            .unwrap();
        assert!(tx.execute("INSERT INTO file_tag VALUES (1, 1, 99)", &[]).is_err());
    }
}
