//! Brings a store's schema up to [`LATEST`].

use crate::database::Tx;
use crate::error::{Error, Result};
use crate::schema;
use crate::version::{self, SchemaVersion, LATEST};

/// One schema step. Applied to stores whose version is below `target`.
pub struct Migration {
    pub target: SchemaVersion,
    pub description: &'static str,
    pub apply: fn(&mut Tx<'_>) -> Result<()>,
}

/// Registered steps, ordered by target.
pub const MIGRATIONS: &[Migration] = &[Migration {
    target: SchemaVersion::new(0, 7, 0, 1),
    description: "add revision column to version table",
    apply: add_version_revision,
}];

/// Creates the schema on a fresh store, otherwise applies pending
/// migrations and stamps the latest version.
pub fn upgrade(tx: &mut Tx<'_>) -> Result<()> {
    if !tx.table_exists("version")? {
        return schema::create_schema(tx);
    }

    let current = version::current(tx)?;
    if current == LATEST {
        tracing::debug!("schema is current at {current}");
        return Ok(());
    }
    if current > LATEST {
        return Err(Error::UnsupportedVersion {
            stored: current,
            latest: LATEST,
        });
    }

    for migration in pending(current) {
        tracing::info!(
            "upgrading schema to {}: {}",
            migration.target,
            migration.description
        );
        (migration.apply)(tx).map_err(|e| Error::migration(migration.description, e))?;
    }

    schema::create_schema(tx)
}

fn pending(current: SchemaVersion) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS.iter().filter(move |m| m.target > current)
}

fn add_version_revision(tx: &mut Tx<'_>) -> Result<()> {
    if !tx.column_exists("version", "revision")? {
        tx.execute(
            "ALTER TABLE version ADD COLUMN revision INT NOT NULL DEFAULT 0",
            &[],
        )?;
    }
    Ok(())
}
