use std::io::Write;

use anyhow::Result;
use tmsu_core::{setting, version, Database, Registry};

pub fn run(registry: &Registry, database: &str, out: &mut impl Write) -> Result<()> {
    let mut db = Database::open_at(registry, database)?;
    let mut tx = db.begin()?;
    let schema = version::current(&mut tx)?;
    let root_path = setting::setting(&mut tx, setting::ROOT_PATH)?;
    tx.commit()?;

    writeln!(out, "Database: {}", db.path())?;
    writeln!(out, "Backend: {}", db.kind())?;
    writeln!(out, "Schema: {schema}")?;
    if let Some(root) = root_path {
        writeln!(out, "Root path: {root}")?;
    }
    Ok(())
}
