//! Structured key-value text (JSON)

use super::{create, finish, open, reject_unknown, CodecOptions, Options, Serialization};
use crate::error::{CheckpointError, CkptResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

pub(super) const EXTENSION: &str = "json";

const ENCODE_OPTIONS: &[&str] = &["pretty"];

/// JSON documents; encode accepts `pretty = true`
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

fn pretty(options: &Options) -> CkptResult<bool> {
    match options.get("pretty") {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(CheckpointError::InvalidOption {
            strategy: "json".to_string(),
            key: "pretty".to_string(),
            reason: format!("expected a boolean, got {}", other),
        }),
    }
}

impl<T: Serialize + DeserializeOwned> Serialization<T> for Json {
    fn extension(&self) -> &str {
        EXTENSION
    }

    fn serialize(&self, value: &T, path: &Path, options: &Options) -> CkptResult<()> {
        reject_unknown("json", options, ENCODE_OPTIONS)?;
        let mut writer = create(path)?;
        let written = if pretty(options)? {
            serde_json::to_writer_pretty(&mut writer, value)
        } else {
            serde_json::to_writer(&mut writer, value)
        };
        written.map_err(|e| CheckpointError::encode(path, e))?;
        finish(writer, path)
    }

    fn deserialize(&self, path: &Path, options: &Options) -> CkptResult<T> {
        reject_unknown("json", options, &[])?;
        serde_json::from_reader(open(path)?).map_err(|e| CheckpointError::decode(path, e))
    }

    fn validate(&self, options: &CodecOptions) -> CkptResult<()> {
        reject_unknown("json", &options.encode, ENCODE_OPTIONS)?;
        pretty(&options.encode)?;
        reject_unknown("json", &options.decode, &[])
    }
}
