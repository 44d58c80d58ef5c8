//! Compact binary object encoding (bincode)

use super::{create, finish, open, reject_unknown, CodecOptions, Options, Serialization};
use crate::error::{CheckpointError, CkptResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

pub(super) const EXTENSION: &str = "bin";

/// Default strategy: any serde value, no options
#[derive(Debug, Clone, Copy, Default)]
pub struct Binary;

impl<T: Serialize + DeserializeOwned> Serialization<T> for Binary {
    fn extension(&self) -> &str {
        EXTENSION
    }

    fn serialize(&self, value: &T, path: &Path, options: &Options) -> CkptResult<()> {
        reject_unknown("binary", options, &[])?;
        let mut writer = create(path)?;
        bincode::serialize_into(&mut writer, value).map_err(|e| CheckpointError::encode(path, e))?;
        finish(writer, path)
    }

    fn deserialize(&self, path: &Path, options: &Options) -> CkptResult<T> {
        reject_unknown("binary", options, &[])?;
        bincode::deserialize_from(open(path)?).map_err(|e| CheckpointError::decode(path, e))
    }

    fn validate(&self, options: &CodecOptions) -> CkptResult<()> {
        reject_unknown("binary", &options.encode, &[])?;
        reject_unknown("binary", &options.decode, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn nested_values_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("value.bin");
        let mut value: BTreeMap<String, Vec<(u8, String)>> = BTreeMap::new();
        value.insert("k".to_string(), vec![(1, "one".to_string()), (2, "two".to_string())]);

        Binary.serialize(&value, &path, &Options::new()).unwrap();
        let back: BTreeMap<String, Vec<(u8, String)>> = Binary.deserialize(&path, &Options::new()).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn truncated_payload_fails_to_decode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("value.bin");
        std::fs::write(&path, [1u8, 0]).unwrap();
        let result: CkptResult<String> = Binary.deserialize(&path, &Options::new());
        assert!(matches!(result, Err(CheckpointError::Decode { .. })));
    }
}
