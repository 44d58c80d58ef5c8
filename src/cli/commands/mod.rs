//! CLI command implementations

pub mod clean;
pub mod config;
pub mod list;
pub mod show;
pub mod verify;

pub use clean::execute as clean;
pub use config::execute as config;
pub use list::execute as list;
pub use show::execute as show;
pub use verify::execute as verify;

use crate::cli::args::RootArgs;
use crate::config::Config;
use crate::store::CacheDirectory;
use std::path::{Path, PathBuf};

/// `--root` if given, `cache.root` otherwise
fn cache_root(args: &RootArgs, config: &Config) -> PathBuf {
    args.root
        .clone()
        .unwrap_or_else(|| config.cache.root.clone())
}

/// `identifier [fingerprint prefix]`
fn directory_label(dir: &CacheDirectory) -> String {
    let prefix: String = dir.fingerprint.chars().take(12).collect();
    format!("{} [{}]", dir.identifier, prefix)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
