use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tmsu_core::{has_scheme, locate, setting, Database, Registry};

/// Initializes every target, collecting one warning per failure instead of
/// stopping at the first.
pub fn run(
    registry: &Registry,
    cwd: &Path,
    database: Option<&str>,
    paths: &[String],
    root_path: Option<&str>,
) -> Vec<String> {
    let mut warnings = Vec::new();

    for path in targets(cwd, database, paths) {
        if let Err(e) = initialize_database(registry, &path) {
            warnings.push(format!("{path}: could not initialize database: {e:#}"));
            continue;
        }
        if let Err(e) = insert_root_path(registry, &path, root_path) {
            warnings.push(format!(
                "{path}: could not initialize database with root path: {e:#}"
            ));
        }
    }

    warnings
}

/// A networked `--database` is initialized on its own; otherwise the given
/// directories, or the working directory when none are given.
pub fn targets(cwd: &Path, database: Option<&str>, paths: &[String]) -> Vec<String> {
    match database {
        Some(db) if has_scheme(db) => vec![db.to_string()],
        _ if paths.is_empty() => vec![cwd.to_string_lossy().into_owned()],
        _ => paths.to_vec(),
    }
}

fn initialize_database(registry: &Registry, path: &str) -> Result<()> {
    eprintln!("{path}: creating database");

    let db_path = if has_scheme(path) {
        path.to_string()
    } else {
        let dir = Path::new(path).join(locate::DATABASE_DIR);
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(e).with_context(|| format!("could not create {}", dir.display()))
            }
        }
        locate::database_in(Path::new(path))
            .to_string_lossy()
            .into_owned()
    };

    Database::create_at(registry, &db_path)?;
    Ok(())
}

fn insert_root_path(registry: &Registry, path: &str, root_path: Option<&str>) -> Result<()> {
    let Some(root) = root_path else {
        return Ok(());
    };
    if !has_scheme(path) {
        return Ok(());
    }

    let mut db = Database::open_at(registry, path)?;
    let mut tx = db.begin()?;
    setting::update_setting(&mut tx, setting::ROOT_PATH, root)?;
    tx.commit()?;
    Ok(())
}
