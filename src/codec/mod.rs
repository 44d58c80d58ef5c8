//! Serialization strategies for checkpoint payloads
//!
//! A strategy writes a value to a path, reads it back and names the file
//! extension of its entries. Options are free-form JSON maps validated by
//! each strategy; unknown keys are rejected.

mod binary;
mod columnar;
mod csv;
mod custom;
mod json;
mod table;

pub use binary::Binary;
pub use columnar::Columnar;
pub use csv::Csv;
pub use custom::Custom;
pub use json::Json;

use crate::error::{CheckpointError, CkptResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Strategy options
pub type Options = Map<String, Value>;

/// Options passed to the encode and decode sides of a strategy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodecOptions {
    #[serde(default)]
    pub encode: Options,
    #[serde(default)]
    pub decode: Options,
}

/// Encode/decode contract for checkpoint payloads
pub trait Serialization<T> {
    /// Extension of entry files, without the leading dot
    fn extension(&self) -> &str;

    /// Write `value` to `path`
    fn serialize(&self, value: &T, path: &Path, options: &Options) -> CkptResult<()>;

    /// Read a value back from `path`
    fn deserialize(&self, path: &Path, options: &Options) -> CkptResult<T>;

    /// Reject options this strategy does not understand
    fn validate(&self, _options: &CodecOptions) -> CkptResult<()> {
        Ok(())
    }
}

/// Built-in strategy selected by name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationKind {
    #[default]
    Binary,
    Csv,
    Columnar,
    Json,
}

impl SerializationKind {
    /// All built-ins
    pub fn all() -> &'static [Self] {
        &[Self::Binary, Self::Csv, Self::Columnar, Self::Json]
    }

    /// Extension of entries written by this strategy
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Binary => binary::EXTENSION,
            Self::Csv => csv::EXTENSION,
            Self::Columnar => columnar::EXTENSION,
            Self::Json => json::EXTENSION,
        }
    }
}

impl fmt::Display for SerializationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Binary => "binary",
            Self::Csv => "csv",
            Self::Columnar => "columnar",
            Self::Json => "json",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SerializationKind {
    type Err = CheckpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.to_string() == s.to_ascii_lowercase())
            .ok_or_else(|| {
                CheckpointError::User(format!(
                    "Unknown serialization `{}` (expected binary, csv, columnar or json)",
                    s
                ))
            })
    }
}

impl<T: Serialize + DeserializeOwned> Serialization<T> for SerializationKind {
    fn extension(&self) -> &str {
        SerializationKind::extension(self)
    }

    fn serialize(&self, value: &T, path: &Path, options: &Options) -> CkptResult<()> {
        match self {
            Self::Binary => Binary.serialize(value, path, options),
            Self::Csv => Csv.serialize(value, path, options),
            Self::Columnar => Columnar.serialize(value, path, options),
            Self::Json => Json.serialize(value, path, options),
        }
    }

    fn deserialize(&self, path: &Path, options: &Options) -> CkptResult<T> {
        match self {
            Self::Binary => Binary.deserialize(path, options),
            Self::Csv => Csv.deserialize(path, options),
            Self::Columnar => Columnar.deserialize(path, options),
            Self::Json => Json.deserialize(path, options),
        }
    }

    fn validate(&self, options: &CodecOptions) -> CkptResult<()> {
        match self {
            Self::Binary => Serialization::<T>::validate(&Binary, options),
            Self::Csv => Serialization::<T>::validate(&Csv, options),
            Self::Columnar => Serialization::<T>::validate(&Columnar, options),
            Self::Json => Serialization::<T>::validate(&Json, options),
        }
    }
}

/// Fail on any option key outside `allowed`
pub(crate) fn reject_unknown(strategy: &str, options: &Options, allowed: &[&str]) -> CkptResult<()> {
    match options.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(CheckpointError::InvalidOption {
            strategy: strategy.to_string(),
            key: key.clone(),
            reason: if allowed.is_empty() {
                "this strategy takes no options".to_string()
            } else {
                format!("expected one of: {}", allowed.join(", "))
            },
        }),
        None => Ok(()),
    }
}

/// Create the file a strategy writes to
pub(crate) fn create(path: &Path) -> CkptResult<std::io::BufWriter<std::fs::File>> {
    let file = std::fs::File::create(path)
        .map_err(|e| CheckpointError::io(format!("creating {}", path.display()), e))?;
    Ok(std::io::BufWriter::new(file))
}

/// Open the file a strategy reads from
pub(crate) fn open(path: &Path) -> CkptResult<std::io::BufReader<std::fs::File>> {
    let file = std::fs::File::open(path)
        .map_err(|e| CheckpointError::io(format!("opening {}", path.display()), e))?;
    Ok(std::io::BufReader::new(file))
}

/// Flush a buffered writer, reporting failure as an encode error
pub(crate) fn finish(mut writer: std::io::BufWriter<std::fs::File>, path: &Path) -> CkptResult<()> {
    use std::io::Write;
    writer.flush().map_err(|e| CheckpointError::encode(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u32,
        label: String,
        score: Option<f64>,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 1,
                label: "alpha".to_string(),
                score: Some(0.5),
            },
            Row {
                id: 2,
                label: "42".to_string(),
                score: None,
            },
        ]
    }

    #[test]
    fn every_builtin_round_trips_records() {
        let dir = TempDir::new().unwrap();
        for kind in SerializationKind::all() {
            let path = dir.path().join(format!("rows.{}", kind.extension()));
            Serialization::<Vec<Row>>::serialize(kind, &rows(), &path, &Options::new()).unwrap();
            let back: Vec<Row> = kind.deserialize(&path, &Options::new()).unwrap();
            assert_eq!(back, rows(), "{} did not round-trip", kind);
        }
    }

    #[test]
    fn kind_names() {
        assert_eq!("json".parse::<SerializationKind>().unwrap(), SerializationKind::Json);
        assert_eq!("CSV".parse::<SerializationKind>().unwrap(), SerializationKind::Csv);
        assert!("pickle".parse::<SerializationKind>().is_err());
        assert_eq!(SerializationKind::default().extension(), "bin");
        assert_eq!(SerializationKind::Columnar.to_string(), "columnar");
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut encode = Options::new();
        encode.insert("compression".to_string(), json!("zstd"));
        let options = CodecOptions {
            encode,
            decode: Options::new(),
        };
        let err = Serialization::<i64>::validate(&SerializationKind::Binary, &options).unwrap_err();
        assert!(matches!(err, CheckpointError::InvalidOption { ref key, .. } if key == "compression"));
    }
}
