//! Column-major frames encoded as CBOR

use super::table::Table;
use super::{create, finish, open, reject_unknown, CodecOptions, Options, Serialization};
use crate::error::{CheckpointError, CkptResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

pub(super) const EXTENSION: &str = "cbor";

/// On-disk frame: one value vector per column
#[derive(Debug, Serialize, Deserialize)]
struct Frame {
    rows: usize,
    columns: Vec<Column>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Column {
    name: String,
    values: Vec<Value>,
}

impl Frame {
    fn from_table(table: Table) -> Self {
        let rows = table.rows.len();
        let columns = table
            .columns
            .iter()
            .map(|name| Column {
                name: name.clone(),
                values: table
                    .rows
                    .iter()
                    .map(|row| Table::cell(row, name).clone())
                    .collect(),
            })
            .collect();
        Self { rows, columns }
    }

    fn into_table(self) -> Result<Table, String> {
        let mut rows = vec![Map::new(); self.rows];
        let mut columns = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            if column.values.len() != self.rows {
                return Err(format!(
                    "column `{}` has {} values, expected {}",
                    column.name,
                    column.values.len(),
                    self.rows
                ));
            }
            for (row, value) in rows.iter_mut().zip(column.values) {
                row.insert(column.name.clone(), value);
            }
            columns.push(column.name);
        }
        Ok(Table { columns, rows })
    }
}

/// Column frames of records; no options
#[derive(Debug, Clone, Copy, Default)]
pub struct Columnar;

impl<T: Serialize + DeserializeOwned> Serialization<T> for Columnar {
    fn extension(&self) -> &str {
        EXTENSION
    }

    fn serialize(&self, value: &T, path: &Path, options: &Options) -> CkptResult<()> {
        reject_unknown("columnar", options, &[])?;
        let value = serde_json::to_value(value).map_err(|e| CheckpointError::encode(path, e))?;
        let table = Table::from_value(value).map_err(|e| CheckpointError::encode(path, e))?;

        let mut writer = create(path)?;
        ciborium::into_writer(&Frame::from_table(table), &mut writer)
            .map_err(|e| CheckpointError::encode(path, e.to_string()))?;
        finish(writer, path)
    }

    fn deserialize(&self, path: &Path, options: &Options) -> CkptResult<T> {
        reject_unknown("columnar", options, &[])?;
        let frame: Frame =
            ciborium::from_reader(open(path)?).map_err(|e| CheckpointError::decode(path, e.to_string()))?;
        let table = frame
            .into_table()
            .map_err(|e| CheckpointError::decode(path, e))?;
        serde_json::from_value(table.into_value()).map_err(|e| CheckpointError::decode(path, e))
    }

    fn validate(&self, options: &CodecOptions) -> CkptResult<()> {
        reject_unknown("columnar", &options.encode, &[])?;
        reject_unknown("columnar", &options.decode, &[])
    }
}
