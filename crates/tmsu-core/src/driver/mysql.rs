use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Connection as _, Row as _, TypeInfo as _, ValueRef as _};
use tokio::runtime::{Builder, Runtime};

use super::Session;
use crate::error::{Error, Result};
use crate::value::{Row, SqlValue};

/// Networked session against a MySQL/MariaDB server.
///
/// sqlx is async; the session owns a current-thread runtime and blocks on
/// each call so callers see the same synchronous surface as SQLite.
pub struct MySqlSession {
    runtime: Runtime,
    conn: MySqlConnection,
}

impl MySqlSession {
    /// `address` is everything after `mysql://`, e.g. `user:pw@host:3306/tags`.
    pub fn connect(address: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let url = format!("mysql://{address}");
        let conn = runtime.block_on(MySqlConnection::connect(&url))?;
        Ok(Self { runtime, conn })
    }

    fn raw(&mut self, sql: &str) -> Result<()> {
        let Self { runtime, conn } = self;
        runtime.block_on(sqlx::raw_sql(sql).execute(&mut *conn))?;
        Ok(())
    }
}

impl Session for MySqlSession {
    fn begin(&mut self) -> Result<()> {
        self.raw("START TRANSACTION")
    }

    fn commit(&mut self) -> Result<()> {
        self.raw("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        self.raw("ROLLBACK")
    }

    fn execute(&mut self, sql: &str, args: &[SqlValue]) -> Result<u64> {
        let Self { runtime, conn } = self;
        let query = args.iter().fold(sqlx::query(sql), bind);
        let result = runtime.block_on(query.execute(&mut *conn))?;
        Ok(result.rows_affected())
    }

    fn query(&mut self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>> {
        let Self { runtime, conn } = self;
        let query = args.iter().fold(sqlx::query(sql), bind);
        let rows = runtime.block_on(query.fetch_all(&mut *conn))?;
        rows.iter().map(decode_row).collect()
    }
}

fn bind<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &'q SqlValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Integer(i) => query.bind(*i),
        SqlValue::Real(r) => query.bind(*r),
        SqlValue::Text(s) => query.bind(s.as_str()),
        SqlValue::Blob(b) => query.bind(b.as_slice()),
    }
}

fn decode_row(row: &MySqlRow) -> Result<Row> {
    (0..row.columns().len())
        .map(|i| decode_column(row, i))
        .collect::<Result<Vec<_>>>()
        .map(Row::new)
}

/// How a column of a given MySQL type name is read into a [`SqlValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoding {
    Unsigned,
    Signed,
    Real,
    DateTime,
    Date,
    Time,
    Binary,
    Text,
    // sqlx only accepts `String` for character columns; these arrive as text
    // on the wire and are read without the type check
    TextUnchecked,
    Bits,
    Unsupported,
}

fn decoding_for(type_name: &str) -> Decoding {
    match type_name {
        name if name.ends_with("UNSIGNED") => Decoding::Unsigned,
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Decoding::Signed
        }
        "FLOAT" | "DOUBLE" => Decoding::Real,
        "DATETIME" | "TIMESTAMP" => Decoding::DateTime,
        "DATE" => Decoding::Date,
        "TIME" => Decoding::Time,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            Decoding::Binary
        }
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM"
        | "SET" => Decoding::Text,
        "DECIMAL" | "JSON" => Decoding::TextUnchecked,
        "BIT" => Decoding::Bits,
        _ => Decoding::Unsupported,
    }
}

fn decode_column(row: &MySqlRow, index: usize) -> Result<SqlValue> {
    let type_name = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(SqlValue::Null);
        }
        raw.type_info().name().to_ascii_uppercase()
    };

    let value = match decoding_for(&type_name) {
        Decoding::Unsigned => {
            let unsigned: u64 = row.try_get(index)?;
            let signed = i64::try_from(unsigned).map_err(|_| Error::Decode {
                column: index,
                reason: format!("{unsigned} does not fit in a signed integer"),
            })?;
            SqlValue::Integer(signed)
        }
        // YEAR is a two-byte integer on the wire but not type-compatible with i64
        Decoding::Signed => SqlValue::Integer(row.try_get_unchecked::<i64, _>(index)?),
        Decoding::Real => SqlValue::Real(row.try_get(index)?),
        Decoding::DateTime => {
            let at: NaiveDateTime = row.try_get(index)?;
            SqlValue::Text(at.format("%Y-%m-%d %H:%M:%S%.f").to_string())
        }
        Decoding::Date => {
            let day: NaiveDate = row.try_get(index)?;
            SqlValue::Text(day.to_string())
        }
        Decoding::Time => {
            let time: NaiveTime = row.try_get(index)?;
            SqlValue::Text(time.format("%H:%M:%S%.f").to_string())
        }
        Decoding::Binary => SqlValue::Blob(row.try_get(index)?),
        Decoding::Text => SqlValue::Text(row.try_get(index)?),
        Decoding::TextUnchecked => SqlValue::Text(row.try_get_unchecked::<String, _>(index)?),
        Decoding::Bits => SqlValue::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        Decoding::Unsupported => {
            return Err(Error::Decode {
                column: index,
                reason: format!("unsupported column type {type_name}"),
            })
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_types() {
        assert_eq!(decoding_for("BIGINT"), Decoding::Signed);
        assert_eq!(decoding_for("BIGINT UNSIGNED"), Decoding::Unsigned);
        assert_eq!(decoding_for("YEAR"), Decoding::Signed);
        assert_eq!(decoding_for("BOOLEAN"), Decoding::Signed);
    }

    #[test]
    fn aggregates_and_wire_text_types() {
        // SUM and AVG produce DECIMAL
        assert_eq!(decoding_for("DECIMAL"), Decoding::TextUnchecked);
        assert_eq!(decoding_for("JSON"), Decoding::TextUnchecked);
        assert_eq!(decoding_for("VARCHAR"), Decoding::Text);
        assert_eq!(decoding_for("ENUM"), Decoding::Text);
    }

    #[test]
    fn temporal_and_binary_types() {
        assert_eq!(decoding_for("DATETIME"), Decoding::DateTime);
        assert_eq!(decoding_for("DATE"), Decoding::Date);
        assert_eq!(decoding_for("TIME"), Decoding::Time);
        assert_eq!(decoding_for("VARBINARY"), Decoding::Binary);
        assert_eq!(decoding_for("BIT"), Decoding::Bits);
    }

    #[test]
    fn unknown_type_is_unsupported() {
        assert_eq!(decoding_for("GEOMETRY"), Decoding::Unsupported);
    }
}
