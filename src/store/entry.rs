//! Entry lookup and atomic publish within one cache directory

use super::directory::CacheDirectory;
use super::manifest::ManifestRecord;
use super::naming::{self, match_entry, parse_entry_date};
use super::notice::Notice;
use super::{sorted_children, sync_dir};
use crate::args::ArgumentKey;
use crate::codec::{Options, Serialization};
use crate::error::{CheckpointError, CkptResult};
use chrono::{Local, NaiveDateTime, Timelike};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A published result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub arg_repr: String,
    pub arg_hash: String,
    pub created_at: NaiveDateTime,
    pub extension: String,
    pub payload_path: PathBuf,
}

/// A value served from the store
#[derive(Debug)]
pub struct Hit<T> {
    pub value: T,
    pub entry: CacheEntry,
    pub notice: Notice,
}

/// Lookup and publish scoped to one cache directory
#[derive(Debug, Clone, Copy)]
pub struct CheckpointStore<'a> {
    dir: &'a CacheDirectory,
}

impl<'a> CheckpointStore<'a> {
    pub fn new(dir: &'a CacheDirectory) -> Self {
        Self { dir }
    }

    /// Locate the entry for a key without decoding it
    ///
    /// The manifest is consulted first; without a usable record the directory
    /// is scanned in sorted order and a match back-fills the manifest.
    pub fn find(&self, key: &ArgumentKey, extension: &str) -> CkptResult<Option<CacheEntry>> {
        let manifest_dir = self.dir.manifest_dir();

        if let Some(record) = ManifestRecord::read(&manifest_dir, &key.hash, extension)? {
            let path = self.dir.path.join(&record.entry);
            if record.arg_hash == key.hash && path.is_file() {
                debug!("Manifest hit for {} in {}", key.representation, self.dir.path.display());
                return self.entry_at(&record.entry, key, extension).map(Some);
            }
            warn!(
                "Stale manifest record for {} in {}; scanning",
                key.representation,
                self.dir.path.display()
            );
        }

        let found = sorted_children(&self.dir.path, false)?
            .into_iter()
            .find(|name| match_entry(name, &key.representation, &key.hash, extension).is_some());
        let Some(name) = found else {
            return Ok(None);
        };

        let entry = self.entry_at(&name, key, extension)?;
        let record = ManifestRecord {
            arg_repr: entry.arg_repr.clone(),
            arg_hash: entry.arg_hash.clone(),
            extension: entry.extension.clone(),
            created_at: entry.created_at,
            entry: name,
        };
        if let Err(e) = record.write(&manifest_dir) {
            warn!("Could not back-fill manifest for {}: {}", key.representation, e);
        }
        Ok(Some(entry))
    }

    /// Look up and decode the entry for a key
    pub fn lookup<T, S>(
        &self,
        key: &ArgumentKey,
        strategy: &S,
        options: &Options,
    ) -> CkptResult<Option<Hit<T>>>
    where
        S: Serialization<T> + ?Sized,
    {
        let Some(entry) = self.find(key, strategy.extension())? else {
            return Ok(None);
        };

        let value = strategy.deserialize(&entry.payload_path, options)?;
        let notice = Notice {
            func: self.dir.identifier.clone(),
            func_hash: self.dir.fingerprint.clone(),
            args: entry.arg_repr.clone(),
            file_path: entry.payload_path.clone(),
            created_at: entry.created_at,
        };
        Ok(Some(Hit {
            value,
            entry,
            notice,
        }))
    }

    /// Serialize and atomically publish a value
    ///
    /// Returns `None` when another writer holds the temporary name for this
    /// key and second; nothing is written in that case.
    pub fn publish<T, S>(
        &self,
        key: &ArgumentKey,
        value: &T,
        strategy: &S,
        options: &Options,
    ) -> CkptResult<Option<CacheEntry>>
    where
        S: Serialization<T> + ?Sized,
    {
        let extension = strategy.extension().to_string();
        let now = Local::now().naive_local();
        let created_at = now.with_nanosecond(0).unwrap_or(now);
        let date = naming::format_date(&created_at);

        let temp_path = self.dir.path.join(naming::temp_entry_name(
            &key.representation,
            &date,
            &key.hash,
            &extension,
        ));
        let entry_file = naming::entry_name(&key.representation, &date, &key.hash, &extension);
        let payload_path = self.dir.path.join(&entry_file);

        match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!(
                    "Another writer is publishing {}; skipping",
                    temp_path.display()
                );
                return Ok(None);
            }
            Err(e) => {
                return Err(CheckpointError::io(
                    format!("creating {}", temp_path.display()),
                    e,
                ))
            }
        }

        if let Err(e) = strategy.serialize(value, &temp_path, options) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        let synced = fs::File::open(&temp_path).and_then(|f| f.sync_all());
        if let Err(e) = synced {
            let _ = fs::remove_file(&temp_path);
            return Err(CheckpointError::io(format!("syncing {}", temp_path.display()), e));
        }

        if let Err(e) = fs::rename(&temp_path, &payload_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(CheckpointError::io(
                format!("publishing {}", payload_path.display()),
                e,
            ));
        }
        sync_dir(&self.dir.path);

        // the entry is live from here on; a missing record is rebuilt by the next scan
        let record = ManifestRecord {
            arg_repr: key.representation.clone(),
            arg_hash: key.hash.clone(),
            extension: extension.clone(),
            created_at,
            entry: entry_file,
        };
        if let Err(e) = record.write(&self.dir.manifest_dir()) {
            warn!("Could not record manifest for {}: {}", key.representation, e);
        }

        info!("Published checkpoint {}", payload_path.display());
        Ok(Some(CacheEntry {
            arg_repr: key.representation.clone(),
            arg_hash: key.hash.clone(),
            created_at,
            extension,
            payload_path,
        }))
    }

    fn entry_at(&self, name: &str, key: &ArgumentKey, extension: &str) -> CkptResult<CacheEntry> {
        let payload_path = self.dir.path.join(name);
        let section = match_entry(name, &key.representation, &key.hash, extension).ok_or_else(|| {
            CheckpointError::corrupt(&payload_path, "entry name does not match its key")
        })?;
        let created_at = parse_entry_date(section)
            .map_err(|e| CheckpointError::corrupt(&payload_path, e.to_string()))?;

        Ok(CacheEntry {
            arg_repr: key.representation.clone(),
            arg_hash: key.hash.clone(),
            created_at,
            extension: extension.to_string(),
            payload_path,
        })
    }
}
