//! Rewrites statements written in the SQLite dialect for other backends.
//!
//! Higher layers write SQL once, SQLite-flavoured. Just before a statement is
//! dispatched it passes through [`translate`] for the connection's backend.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::driver::BackendKind;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("dialect rule pattern is valid"),
            replacement,
        }
    }
}

// Applied in order.
static MYSQL_RULES: LazyLock<[Rule; 4]> = LazyLock::new(|| {
    [
        // numbered placeholders are not supported
        Rule::new(r"\?\d+", "?"),
        Rule::new(r"INSERT\s+OR\s+IGNORE\s+", "INSERT IGNORE "),
        Rule::new(r"INSERT\s+OR\s+REPLACE\s+", "REPLACE "),
        Rule::new(r"==", "="),
    ]
});

pub fn translate(kind: BackendKind, sql: &str) -> Cow<'_, str> {
    match kind {
        BackendKind::Sqlite => Cow::Borrowed(sql),
        BackendKind::MySql => compat_mysql(sql),
    }
}

fn compat_mysql(sql: &str) -> Cow<'_, str> {
    MYSQL_RULES.iter().fold(Cow::Borrowed(sql), |sql, rule| {
        let rewritten = match rule.pattern.replace_all(&sql, rule.replacement) {
            Cow::Borrowed(_) => None,
            Cow::Owned(rewritten) => Some(rewritten),
        };
        rewritten.map_or(sql, Cow::Owned)
    })
}

/// Query counting tables named `?1` in the current database.
pub const fn table_exists_sql(kind: BackendKind) -> &'static str {
    match kind {
        BackendKind::Sqlite => {
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1"
        }
        BackendKind::MySql => {
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_name = ?1"
        }
    }
}

/// Query counting indexes named `?1` in the current database.
pub const fn index_exists_sql(kind: BackendKind) -> &'static str {
    match kind {
        BackendKind::Sqlite => {
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?1"
        }
        BackendKind::MySql => {
            "SELECT COUNT(DISTINCT index_name) FROM information_schema.statistics \
             WHERE table_schema = DATABASE() AND index_name = ?1"
        }
    }
}

/// Query counting columns named `?2` on table `?1` in the current database.
pub const fn column_exists_sql(kind: BackendKind) -> &'static str {
    match kind {
        BackendKind::Sqlite => "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        BackendKind::MySql => {
            "SELECT COUNT(*) FROM information_schema.columns \
             WHERE table_schema = DATABASE() AND table_name = ?1 AND column_name = ?2"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUTS: [&str; 4] = [
        "INSERT OR IGNORE INTO tag (id, name) VALUES (?1, ?2)",
        "INSERT OR REPLACE INTO setting (name, value) VALUES (?, ?)",
        "SELECT id FROM tag WHERE name == ?",
        "SELECT id FROM file WHERE directory = ?1 AND name = ?2",
    ];

    #[test]
    fn sqlite_is_identity() {
        for input in INPUTS {
            let out = translate(BackendKind::Sqlite, input);
            assert!(matches!(out, Cow::Borrowed(_)));
            assert_eq!(out, input);
        }
    }

    #[test]
    fn mysql_insert_or_ignore() {
        assert_eq!(
            translate(BackendKind::MySql, INPUTS[0]),
            "INSERT IGNORE INTO tag (id, name) VALUES (?, ?)"
        );
    }

    #[test]
    fn mysql_insert_or_replace() {
        assert_eq!(
            translate(BackendKind::MySql, INPUTS[1]),
            "REPLACE INTO setting (name, value) VALUES (?, ?)"
        );
    }

    #[test]
    fn mysql_double_equals() {
        assert_eq!(
            translate(BackendKind::MySql, INPUTS[2]),
            "SELECT id FROM tag WHERE name = ?"
        );
    }

    #[test]
    fn mysql_numbered_placeholders() {
        assert_eq!(
            translate(BackendKind::MySql, INPUTS[3]),
            "SELECT id FROM file WHERE directory = ? AND name = ?"
        );
        assert_eq!(translate(BackendKind::MySql, "?12"), "?");
    }

    #[test]
    fn mysql_tolerates_whitespace_between_keywords() {
        assert_eq!(
            translate(BackendKind::MySql, "INSERT  OR\n    IGNORE\tINTO x VALUES (1)"),
            "INSERT IGNORE INTO x VALUES (1)"
        );
    }

    #[test]
    fn mysql_untouched_statement_is_borrowed() {
        let sql = "SELECT COUNT(*) FROM `value`";
        assert!(matches!(translate(BackendKind::MySql, sql), Cow::Borrowed(_)));
    }

    #[test]
    fn mysql_catalog_queries_use_plain_placeholders() {
        let sql = translate(BackendKind::MySql, column_exists_sql(BackendKind::MySql));
        assert!(sql.ends_with("table_name = ? AND column_name = ?"));
    }

    #[test]
    fn mysql_translation_is_deterministic() {
        let first = translate(BackendKind::MySql, INPUTS[0]).into_owned();
        let second = translate(BackendKind::MySql, INPUTS[0]).into_owned();
        assert_eq!(first, second);
    }
}
