//! The schema version stamp kept in the `version` table.

use std::fmt;

use crate::database::Tx;
use crate::error::{Error, Result};
use crate::value::Row;

/// Structural generation of the persisted schema. Ordered field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub revision: u32,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32, patch: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            revision,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}-{}",
            self.major, self.minor, self.patch, self.revision
        )
    }
}

pub const LATEST: SchemaVersion = SchemaVersion::new(0, 7, 0, 1);

/// Reads the stored version. An empty table reads as the zero version.
///
/// Stores written before 0.7.0-1 have no `revision` column; a three-column
/// row is read with a revision of zero.
pub fn current(tx: &mut Tx<'_>) -> Result<SchemaVersion> {
    match tx.query_row("SELECT * FROM version", &[])? {
        Some(row) => decode(&row),
        None => Ok(SchemaVersion::default()),
    }
}

fn decode(row: &Row) -> Result<SchemaVersion> {
    let revision = match row.len() {
        4 => row.get::<u32>(3)?,
        3 => 0,
        n => {
            return Err(Error::Decode {
                column: n,
                reason: format!("version row has {n} columns, expected 3 or 4"),
            })
        }
    };
    Ok(SchemaVersion::new(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        revision,
    ))
}

pub fn insert(tx: &mut Tx<'_>, version: SchemaVersion) -> Result<()> {
    let affected = tx.execute(
        "INSERT INTO version (major, minor, patch, revision) VALUES (?1, ?2, ?3, ?4)",
        &[
            version.major.into(),
            version.minor.into(),
            version.patch.into(),
            version.revision.into(),
        ],
    )?;
    if affected != 1 {
        return Err(Error::Constraint {
            what: "version could not be inserted",
            affected,
        });
    }
    Ok(())
}

/// Rewrites the stored version. Returns `false` without touching the table
/// when it already holds `version`.
pub fn update(tx: &mut Tx<'_>, version: SchemaVersion) -> Result<bool> {
    if current(tx)? == version {
        return Ok(false);
    }

    let affected = tx.execute(
        "UPDATE version SET major = ?1, minor = ?2, patch = ?3, revision = ?4",
        &[
            version.major.into(),
            version.minor.into(),
            version.patch.into(),
            version.revision.into(),
        ],
    )?;
    if affected != 1 {
        return Err(Error::Constraint {
            what: "version could not be updated",
            affected,
        });
    }
    Ok(true)
}
