//! Finding the database to use when none is named explicitly.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Directory holding a local database.
pub const DATABASE_DIR: &str = ".tmsu";
/// Database file inside [`DATABASE_DIR`].
pub const DATABASE_FILE: &str = "db";
/// Fallback database under the home directory's [`DATABASE_DIR`].
pub const DEFAULT_DATABASE_FILE: &str = "default.db";

/// `<dir>/.tmsu/db`
pub fn database_in(dir: &Path) -> PathBuf {
    dir.join(DATABASE_DIR).join(DATABASE_FILE)
}

/// The explicit path when given, otherwise the nearest `.tmsu/db` at or
/// above the working directory, otherwise `~/.tmsu/default.db`.
pub fn resolve(explicit: Option<&str>) -> Result<String> {
    if let Some(path) = explicit {
        return Ok(path.to_string());
    }

    let cwd = env::current_dir()?;
    if let Some(found) = find_upwards(&cwd) {
        return Ok(found.to_string_lossy().into_owned());
    }

    let fallback = home_database(dirs::home_dir())?;
    tracing::debug!("no local database found, using '{}'", fallback.display());
    Ok(fallback.to_string_lossy().into_owned())
}

fn home_database(home: Option<PathBuf>) -> Result<PathBuf> {
    let home = home.ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "no database found and the home directory could not be identified",
        )
    })?;
    Ok(home.join(DATABASE_DIR).join(DEFAULT_DATABASE_FILE))
}

pub fn find_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = database_in(&dir);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn explicit_path_wins() {
        assert_eq!(
            resolve(Some("mysql://localhost/tags")).unwrap(),
            "mysql://localhost/tags"
        );
    }

    #[test]
    fn default_database_lives_under_home() {
        assert_eq!(
            home_database(Some(PathBuf::from("/home/u"))).unwrap(),
            PathBuf::from("/home/u/.tmsu/default.db")
        );
    }

    #[test]
    fn unknown_home_is_an_error() {
        let err = home_database(None).unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn finds_database_in_ancestor() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(DATABASE_DIR)).unwrap();
        fs::write(database_in(dir.path()), b"").unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_upwards(&nested), Some(database_in(dir.path())));
    }

    #[test]
    fn nearest_database_wins() {
        let dir = TempDir::new().unwrap();
        let inner = dir.path().join("inner");
        for root in [dir.path(), inner.as_path()] {
            fs::create_dir_all(root.join(DATABASE_DIR)).unwrap();
            fs::write(database_in(root), b"").unwrap();
        }

        assert_eq!(find_upwards(&inner), Some(database_in(&inner)));
    }

    #[test]
    fn directory_named_db_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(database_in(dir.path())).unwrap();
        assert_ne!(find_upwards(dir.path()), Some(database_in(dir.path())));
    }
}
