//! Backend-neutral statement parameters and result rows.

use std::fmt;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(r) => Self::Real(r),
            // text that is not UTF-8 is kept byte for byte
            ValueRef::Text(t) => std::str::from_utf8(t)
                .map_or_else(|_| Self::Blob(t.to_vec()), |s| Self::Text(s.to_string())),
            ValueRef::Blob(b) => Self::Blob(b.to_vec()),
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Self::Null => ValueRef::Null,
            Self::Integer(i) => ValueRef::Integer(*i),
            Self::Real(r) => ValueRef::Real(*r),
            Self::Text(s) => ValueRef::Text(s.as_bytes()),
            Self::Blob(b) => ValueRef::Blob(b),
        };
        Ok(ToSqlOutput::Borrowed(value))
    }
}

/// Conversion from a column value into a Rust type.
pub trait FromSqlValue: Sized {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String>;
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::Integer(i) => Ok(*i),
            SqlValue::Text(s) => s.parse().map_err(|_| format!("'{s}' is not an integer")),
            other => Err(format!("expected integer, found {other}")),
        }
    }
}

impl FromSqlValue for u32 {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        let i = i64::from_sql_value(value)?;
        Self::try_from(i).map_err(|_| format!("{i} is out of range"))
    }
}

impl FromSqlValue for u64 {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        let i = i64::from_sql_value(value)?;
        Self::try_from(i).map_err(|_| format!("{i} is out of range"))
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        i64::from_sql_value(value).map(|i| i != 0)
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::Real(r) => Ok(*r),
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Integer(i) => Ok(*i as Self),
            other => Err(format!("expected real, found {other}")),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::Text(s) => Ok(s.clone()),
            SqlValue::Integer(i) => Ok(i.to_string()),
            SqlValue::Real(r) => Ok(r.to_string()),
            other => Err(format!("expected text, found {other}")),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

/// One result row, columns in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    pub const fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn get<T: FromSqlValue>(&self, column: usize) -> Result<T> {
        let value = self.values.get(column).ok_or_else(|| Error::Decode {
            column,
            reason: format!("row has only {} columns", self.values.len()),
        })?;
        T::from_sql_value(value).map_err(|reason| Error::Decode { column, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_converts_columns() {
        let row = Row::new(vec![
            SqlValue::Integer(7),
            "name".into(),
            SqlValue::Null,
            true.into(),
        ]);

        assert_eq!(row.get::<u32>(0).unwrap(), 7);
        assert_eq!(row.get::<String>(1).unwrap(), "name");
        assert_eq!(row.get::<Option<i64>>(2).unwrap(), None);
        assert!(row.get::<bool>(3).unwrap());
    }

    #[test]
    fn get_reports_missing_column() {
        let row = Row::new(vec![SqlValue::Integer(1)]);
        let err = row.get::<i64>(3).unwrap_err();
        assert!(matches!(err, Error::Decode { column: 3, .. }));
    }

    #[test]
    fn negative_integer_is_not_unsigned() {
        let row = Row::new(vec![SqlValue::Integer(-1)]);
        assert!(row.get::<u32>(0).is_err());
    }

    #[test]
    fn invalid_utf8_text_is_kept_as_bytes() {
        assert_eq!(
            SqlValue::from(ValueRef::Text(b"f\xFFo")),
            SqlValue::Blob(vec![0x66, 0xFF, 0x6F])
        );
        assert_eq!(
            SqlValue::from(ValueRef::Text(b"foo")),
            SqlValue::Text("foo".to_string())
        );
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("a")), SqlValue::Text("a".to_string()));
    }
}
