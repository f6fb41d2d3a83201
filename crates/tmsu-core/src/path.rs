//! Connection path parsing.
//!
//! A connection path is `[scheme://]address`. A path carrying a scheme names a
//! registered driver; anything else is a filesystem path to an embedded store.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

const SEPARATOR: &str = "://";

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+?)://").expect("scheme pattern is valid"));

/// Where a connection path points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Embedded(PathBuf),
    Networked { scheme: String, address: String },
}

impl Location {
    pub fn parse(path: &str) -> Self {
        match scheme(path) {
            Some(scheme) if scheme.len() > 1 => Self::Networked {
                scheme: scheme.to_string(),
                address: split_path_from_scheme(path).to_string(),
            },
            _ => Self::Embedded(PathBuf::from(path)),
        }
    }

    pub const fn is_networked(&self) -> bool {
        matches!(self, Self::Networked { .. })
    }
}

/// The word characters immediately before the first `://`, e.g. `mysql` for
/// `mysql://db`.
pub fn scheme(path: &str) -> Option<&str> {
    SCHEME
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The part after the scheme separator, or the whole path when there is none.
pub fn split_path_from_scheme(path: &str) -> &str {
    path.split_once(SEPARATOR).map_or(path, |(_, rest)| rest)
}

/// Single-character schemes are ignored so drive-letter-like prefixes stay
/// local paths.
pub fn has_scheme(path: &str) -> bool {
    scheme(path).is_some_and(|s| s.len() > 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_scheme() {
        assert!(has_scheme("mysql://host/db"));
        assert_eq!(scheme("mysql://host/db"), Some("mysql"));
        assert_eq!(split_path_from_scheme("mysql://host/db"), "host/db");
    }

    #[test]
    fn plain_path_has_no_scheme() {
        assert!(!has_scheme("/tmp/db"));
        assert_eq!(scheme("/tmp/db"), None);
        assert_eq!(split_path_from_scheme("/tmp/db"), "/tmp/db");
    }

    #[test]
    fn single_character_scheme_ignored() {
        assert!(!has_scheme("x://y"));
        assert_eq!(scheme("x://y"), Some("x"));
        assert_eq!(
            Location::parse("x://y"),
            Location::Embedded(PathBuf::from("x://y"))
        );
    }

    #[test]
    fn two_character_scheme_accepted() {
        assert!(has_scheme("ab://y"));
    }

    #[test]
    fn separator_without_word_characters() {
        assert!(!has_scheme("://host"));
        assert!(!has_scheme("/a/-://b"));
    }

    #[test]
    fn only_first_separator_splits() {
        assert_eq!(
            split_path_from_scheme("mysql://user:pw@tcp(host)/db?x=a://b"),
            "user:pw@tcp(host)/db?x=a://b"
        );
    }

    #[test]
    fn parse_networked() {
        assert_eq!(
            Location::parse("mysql://root@localhost/tags"),
            Location::Networked {
                scheme: "mysql".to_string(),
                address: "root@localhost/tags".to_string(),
            }
        );
        assert!(Location::parse("mysql://h/d").is_networked());
        assert!(!Location::parse("/home/me/.tmsu/db").is_networked());
    }
}
