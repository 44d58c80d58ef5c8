//! Per-directory manifest
//!
//! Each published entry gets a JSON record at
//! `manifest/{arg_hash}.{ext}.json` naming its file, so lookups do not scan
//! the directory. Records are written atomically; the last writer wins.

use super::naming::manifest_name;
use super::{sorted_children, write_atomic};
use crate::error::{CheckpointError, CkptResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Index record for one (argument hash, extension)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub arg_repr: String,
    pub arg_hash: String,
    pub extension: String,
    pub created_at: NaiveDateTime,
    /// Entry filename, relative to the cache directory
    pub entry: String,
}

impl ManifestRecord {
    /// Where the record for a key lives
    pub fn path(manifest_dir: &Path, arg_hash: &str, extension: &str) -> PathBuf {
        manifest_dir.join(manifest_name(arg_hash, extension))
    }

    /// Read the record for a key
    ///
    /// A missing record is `None`. An unreadable one is logged and treated as
    /// missing so the caller falls back to scanning.
    pub fn read(manifest_dir: &Path, arg_hash: &str, extension: &str) -> CkptResult<Option<Self>> {
        let path = Self::path(manifest_dir, arg_hash, extension);
        match Self::load(&path) {
            Ok(record) => Ok(Some(record)),
            Err(CheckpointError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(CheckpointError::Json(e)) => {
                warn!("Ignoring unreadable manifest record {}: {}", path.display(), e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Load a record file
    pub fn load(path: &Path) -> CkptResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CheckpointError::io(format!("reading manifest record {}", path.display()), e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Atomically write this record
    pub fn write(&self, manifest_dir: &Path) -> CkptResult<()> {
        fs::create_dir_all(manifest_dir).map_err(|e| {
            CheckpointError::io(format!("creating manifest directory {}", manifest_dir.display()), e)
        })?;
        let data = serde_json::to_vec_pretty(self)?;
        write_atomic(&Self::path(manifest_dir, &self.arg_hash, &self.extension), &data)
    }

    /// Every record file in a manifest directory
    pub fn list(manifest_dir: &Path) -> CkptResult<Vec<PathBuf>> {
        if !manifest_dir.is_dir() {
            return Ok(Vec::new());
        }
        Ok(sorted_children(manifest_dir, false)?
            .into_iter()
            .filter(|name| name.ends_with(".json") && !name.starts_with('.'))
            .map(|name| manifest_dir.join(name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record() -> ManifestRecord {
        ManifestRecord {
            arg_repr: "a=1".to_string(),
            arg_hash: "f".repeat(64),
            extension: "json".to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
            entry: "a=1_[01-02-2024-03-04-05]_x_checkpoint.json".to_string(),
        }
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("manifest");
        record().write(&manifest).unwrap();

        let back = ManifestRecord::read(&manifest, &"f".repeat(64), "json").unwrap();
        assert_eq!(back, Some(record()));
        assert_eq!(ManifestRecord::list(&manifest).unwrap().len(), 1);
    }

    #[test]
    fn missing_record_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(ManifestRecord::read(dir.path(), "abc", "bin").unwrap(), None);
        assert!(ManifestRecord::list(&dir.path().join("manifest")).unwrap().is_empty());
    }

    #[test]
    fn garbled_record_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(ManifestRecord::path(dir.path(), "abc", "bin"), "{not json").unwrap();
        assert_eq!(ManifestRecord::read(dir.path(), "abc", "bin").unwrap(), None);
    }
}
