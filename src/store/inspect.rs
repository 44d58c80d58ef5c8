//! Read-only enumeration of a cache root

use super::directory::CacheDirectory;
use super::entry::CacheEntry;
use super::manifest::ManifestRecord;
use super::naming::NameError;
use super::sorted_children;
use crate::error::{CheckpointError, CkptResult};
use std::path::{Path, PathBuf};

pub use super::naming::{parse_entry_name, EntryName};

/// One file in a cache directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// A published entry
    Valid(CacheEntry),
    /// A temporary file left behind by an interrupted publish
    Incomplete { path: PathBuf, name: EntryName },
    /// A file shaped like an entry whose name does not parse
    Corrupt { path: PathBuf, reason: String },
}

impl Listing {
    pub fn path(&self) -> &Path {
        match self {
            Self::Valid(entry) => &entry.payload_path,
            Self::Incomplete { path, .. } | Self::Corrupt { path, .. } => path,
        }
    }
}

/// State of one manifest record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    Valid(ManifestRecord),
    /// The entry it names no longer exists
    Stale(ManifestRecord),
    Unreadable(String),
}

/// Every cache directory under `root`, in sorted order
pub fn list_directories(root: &Path) -> CkptResult<Vec<CacheDirectory>> {
    if !root.is_dir() {
        return Err(CheckpointError::RootNotFound(root.to_path_buf()));
    }
    Ok(sorted_children(root, true)?
        .into_iter()
        .filter_map(|name| CacheDirectory::from_name(root, &name))
        .collect())
}

/// Every entry-shaped file in a cache directory, in sorted order
pub fn list_entries(dir: &CacheDirectory) -> CkptResult<Vec<Listing>> {
    let mut listings = Vec::new();
    for name in sorted_children(&dir.path, false)? {
        let path = dir.path.join(&name);
        match parse_entry_name(&name) {
            Ok(parsed) if parsed.incomplete => listings.push(Listing::Incomplete { path, name: parsed }),
            Ok(parsed) => listings.push(Listing::Valid(CacheEntry {
                arg_repr: parsed.arg_repr,
                arg_hash: parsed.arg_hash,
                created_at: parsed.created_at,
                extension: parsed.extension,
                payload_path: path,
            })),
            Err(NameError::NotAnEntry) => {}
            Err(e) => listings.push(Listing::Corrupt {
                path,
                reason: e.to_string(),
            }),
        }
    }
    Ok(listings)
}

/// Every manifest record of a cache directory with its state
pub fn list_records(dir: &CacheDirectory) -> CkptResult<Vec<(PathBuf, RecordStatus)>> {
    let mut records = Vec::new();
    for path in ManifestRecord::list(&dir.manifest_dir())? {
        let status = match ManifestRecord::load(&path) {
            Ok(record) if dir.path.join(&record.entry).is_file() => RecordStatus::Valid(record),
            Ok(record) => RecordStatus::Stale(record),
            Err(e) => RecordStatus::Unreadable(e.to_string()),
        };
        records.push((path, status));
    }
    Ok(records)
}
