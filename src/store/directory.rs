//! Cache directory resolution
//!
//! Maps a logic identity to `{identifier}_[{date}]_{fingerprint}_checkpoint/`
//! under a cache root, creating the directory and its audit source on first
//! use. No locking: two first-time callers racing in the same second share
//! one directory, in different seconds each creates its own and later
//! lookups pick the first in sorted order.

use super::naming::{self, parse_directory_name, MANIFEST_DIR};
use super::{sorted_children, write_atomic};
use crate::error::{CheckpointError, CkptResult};
use crate::fingerprint::LogicIdentity;
use chrono::{Local, NaiveDateTime, Timelike};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A directory holding every entry for one version of a computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDirectory {
    pub path: PathBuf,
    pub identifier: String,
    pub fingerprint: String,
    pub created_at: NaiveDateTime,
}

impl CacheDirectory {
    /// Find or create the directory for `identity` under `root`
    pub fn resolve(
        root: &Path,
        identity: &LogicIdentity,
        source: &str,
        source_extension: &str,
    ) -> CkptResult<Self> {
        fs::create_dir_all(root).map_err(|e| {
            CheckpointError::io(format!("creating cache root {}", root.display()), e)
        })?;

        if let Some(existing) = Self::find(root, identity)? {
            debug!(
                "Using cache directory {} for {}",
                existing.path.display(),
                identity.name
            );
            return Ok(existing);
        }

        let now = Local::now().naive_local();
        let created_at = now.with_nanosecond(0).unwrap_or(now);
        let name = naming::directory_name(
            &identity.name,
            &naming::format_date(&created_at),
            &identity.fingerprint,
        );
        let path = root.join(name);

        match fs::create_dir(&path) {
            Ok(()) => debug!("Created cache directory {}", path.display()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("Cache directory {} created concurrently", path.display())
            }
            Err(e) => {
                return Err(CheckpointError::io(
                    format!("creating cache directory {}", path.display()),
                    e,
                ))
            }
        }

        let directory = Self {
            path,
            identifier: identity.name.clone(),
            fingerprint: identity.fingerprint.clone(),
            created_at,
        };

        let source_path = directory.source_path(source_extension);
        if !source_path.exists() {
            write_atomic(&source_path, source.as_bytes())?;
        }
        Ok(directory)
    }

    /// First existing directory for `identity`, in sorted name order
    pub fn find(root: &Path, identity: &LogicIdentity) -> CkptResult<Option<Self>> {
        if !root.is_dir() {
            return Ok(None);
        }
        Ok(sorted_children(root, true)?
            .into_iter()
            .filter_map(|name| Self::from_name(root, &name))
            .find(|dir| dir.identifier == identity.name && dir.fingerprint == identity.fingerprint))
    }

    /// Interpret a child of `root` as a cache directory
    pub fn from_name(root: &Path, name: &str) -> Option<Self> {
        let parsed = parse_directory_name(name)?;
        Some(Self {
            path: root.join(name),
            identifier: parsed.identifier,
            fingerprint: parsed.fingerprint,
            created_at: parsed.created_at,
        })
    }

    /// Path of the audit copy of the computation's source
    pub fn source_path(&self, extension: &str) -> PathBuf {
        self.path.join(naming::source_name(&self.identifier, extension))
    }

    /// Existing audit source, whatever its extension
    pub fn find_source(&self) -> Option<PathBuf> {
        let prefix = format!("{}_source.", self.identifier);
        sorted_children(&self.path, false)
            .ok()?
            .into_iter()
            .find(|name| name.starts_with(&prefix))
            .map(|name| self.path.join(name))
    }

    /// Directory holding manifest records
    pub fn manifest_dir(&self) -> PathBuf {
        self.path.join(MANIFEST_DIR)
    }
}
