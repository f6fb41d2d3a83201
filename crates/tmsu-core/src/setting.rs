use crate::database::Tx;
use crate::error::Result;

/// Root used to resolve relative file paths stored in a networked database.
pub const ROOT_PATH: &str = "rootPath";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub name: String,
    pub value: String,
}

pub fn settings(tx: &mut Tx<'_>) -> Result<Vec<Setting>> {
    tx.query("SELECT name, value FROM setting ORDER BY name", &[])?
        .iter()
        .map(|row| -> Result<Setting> {
            Ok(Setting {
                name: row.get(0)?,
                value: row.get(1)?,
            })
        })
        .collect()
}

pub fn setting(tx: &mut Tx<'_>, name: &str) -> Result<Option<String>> {
    tx.query_row("SELECT value FROM setting WHERE name == ?1", &[name.into()])?
        .map(|row| row.get(0))
        .transpose()
}

pub fn update_setting(tx: &mut Tx<'_>, name: &str, value: &str) -> Result<()> {
    tx.execute(
        "INSERT OR REPLACE INTO setting (name, value) VALUES (?1, ?2)",
        &[name.into(), value.into()],
    )?;
    Ok(())
}
