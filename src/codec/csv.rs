//! Row-oriented text tables (CSV)
//!
//! Plain strings are written as-is. Every other cell holds JSON text, as do
//! strings that would otherwise read back as something else (`"42"`,
//! `"true"`, the empty string). An empty cell is `null`.

use super::table::Table;
use super::{create, open, reject_unknown, CodecOptions, Options, Serialization};
use crate::error::{CheckpointError, CkptResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

pub(super) const EXTENSION: &str = "csv";

const OPTIONS: &[&str] = &["delimiter"];

/// CSV tables of records; accepts `delimiter` on both sides
#[derive(Debug, Clone, Copy, Default)]
pub struct Csv;

fn delimiter(options: &Options) -> CkptResult<u8> {
    let invalid = |reason: String| CheckpointError::InvalidOption {
        strategy: "csv".to_string(),
        key: "delimiter".to_string(),
        reason,
    };
    match options.get("delimiter") {
        None => Ok(b','),
        Some(Value::String(s)) if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        Some(other) => Err(invalid(format!("expected a single ASCII character, got {}", other))),
    }
}

fn encode_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) if !s.is_empty() && serde_json::from_str::<Value>(s).is_err() => s.clone(),
        other => other.to_string(),
    }
}

fn decode_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(cell).unwrap_or_else(|_| Value::String(cell.to_string()))
}

impl<T: Serialize + DeserializeOwned> Serialization<T> for Csv {
    fn extension(&self) -> &str {
        EXTENSION
    }

    fn serialize(&self, value: &T, path: &Path, options: &Options) -> CkptResult<()> {
        reject_unknown("csv", options, OPTIONS)?;
        let delimiter = delimiter(options)?;

        let value = serde_json::to_value(value).map_err(|e| CheckpointError::encode(path, e))?;
        let table = Table::from_value(value).map_err(|e| CheckpointError::encode(path, e))?;

        let mut writer = ::csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(create(path)?);
        if !table.columns.is_empty() {
            writer
                .write_record(&table.columns)
                .map_err(|e| CheckpointError::encode(path, e))?;
        }
        for row in &table.rows {
            let cells = table.columns.iter().map(|c| encode_cell(Table::cell(row, c)));
            writer
                .write_record(cells)
                .map_err(|e| CheckpointError::encode(path, e))?;
        }
        writer.flush().map_err(|e| CheckpointError::encode(path, e))
    }

    fn deserialize(&self, path: &Path, options: &Options) -> CkptResult<T> {
        reject_unknown("csv", options, OPTIONS)?;
        let delimiter = delimiter(options)?;

        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_reader(open(path)?);
        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| CheckpointError::decode(path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut table = Table {
            columns,
            rows: Vec::new(),
        };
        for record in reader.records() {
            let record = record.map_err(|e| CheckpointError::decode(path, e))?;
            let row: Map<String, Value> = table
                .columns
                .iter()
                .zip(record.iter())
                .map(|(column, cell)| (column.clone(), decode_cell(cell)))
                .collect();
            table.rows.push(row);
        }

        serde_json::from_value(table.into_value()).map_err(|e| CheckpointError::decode(path, e))
    }

    fn validate(&self, options: &CodecOptions) -> CkptResult<()> {
        for side in [&options.encode, &options.decode] {
            reject_unknown("csv", side, OPTIONS)?;
            delimiter(side)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Measurement {
        sensor: String,
        reading: f64,
        tags: Vec<String>,
        note: Option<String>,
    }

    #[test]
    fn cells_keep_their_types() {
        assert_eq!(encode_cell(&json!("plain")), "plain");
        assert_eq!(encode_cell(&json!("42")), "\"42\"");
        assert_eq!(encode_cell(&json!("")), "\"\"");
        assert_eq!(encode_cell(&json!(42)), "42");
        assert_eq!(encode_cell(&Value::Null), "");

        for value in [json!("plain"), json!("42"), json!(""), json!(42), json!([1]), Value::Null] {
            assert_eq!(decode_cell(&encode_cell(&value)), value);
        }
    }

    #[test]
    fn records_round_trip_with_delimiter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.csv");
        let mut options = Options::new();
        options.insert("delimiter".to_string(), json!(";"));

        let rows = vec![
            Measurement {
                sensor: "north; upper".to_string(),
                reading: 1.25,
                tags: vec!["a".to_string()],
                note: None,
            },
            Measurement {
                sensor: "south".to_string(),
                reading: -3.0,
                tags: vec![],
                note: Some("true".to_string()),
            },
        ];
        Csv.serialize(&rows, &path, &options).unwrap();
        let back: Vec<Measurement> = Csv.deserialize(&path, &options).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn scalar_value_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.csv");
        let err = Csv.serialize(&5i64, &path, &Options::new()).unwrap_err();
        assert!(matches!(err, CheckpointError::Encode { .. }));
    }

    #[test]
    fn delimiter_must_be_one_character() {
        let mut options = Options::new();
        options.insert("delimiter".to_string(), json!("::"));
        assert!(delimiter(&options).is_err());
    }

    #[test]
    fn empty_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("e.csv");
        let rows: Vec<Measurement> = vec![];
        Csv.serialize(&rows, &path, &Options::new()).unwrap();
        let back: Vec<Measurement> = Csv.deserialize(&path, &Options::new()).unwrap();
        assert!(back.is_empty());
    }
}
