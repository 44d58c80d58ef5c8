//! On-disk checkpoint store
//!
//! A cache root holds one directory per (identifier, fingerprint) pair. Each
//! directory holds the audit copy of the computation's source, the published
//! entries and a manifest indexing entries by argument hash.

pub mod directory;
pub mod entry;
pub mod inspect;
pub mod manifest;
pub mod naming;
pub mod notice;

pub use directory::CacheDirectory;
pub use entry::{CacheEntry, CheckpointStore, Hit};
pub use manifest::ManifestRecord;
pub use notice::{Notice, NoticeTemplate, DEFAULT_NOTICE_TEMPLATE};

use crate::error::{CheckpointError, CkptResult};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write a small file atomically: temp file, fsync, rename, fsync directory
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> CkptResult<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    let written = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(CheckpointError::io(format!("writing {}", path.display()), e));
    }

    if let Some(parent) = path.parent() {
        sync_dir(parent);
    }
    Ok(())
}

/// Best-effort fsync of a directory so a rename inside it is durable
pub(crate) fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    {
        if let Ok(handle) = fs::File::open(dir) {
            let _ = handle.sync_all();
        }
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
    }
}

/// Sorted file names of a directory's immediate children
pub(crate) fn sorted_children(dir: &Path, want_dirs: bool) -> CkptResult<Vec<String>> {
    let reader = fs::read_dir(dir)
        .map_err(|e| CheckpointError::io(format!("reading directory {}", dir.display()), e))?;

    let mut names = Vec::new();
    for item in reader {
        let item = item
            .map_err(|e| CheckpointError::io(format!("reading directory {}", dir.display()), e))?;
        let is_dir = item.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir != want_dirs {
            continue;
        }
        if let Some(name) = item.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
