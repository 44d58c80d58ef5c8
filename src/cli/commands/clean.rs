//! Clean command - remove leftovers of interrupted publishes

use super::{cache_root, file_name};
use crate::cli::args::CleanArgs;
use crate::config::Config;
use crate::error::{CheckpointError, CkptResult};
use crate::store::inspect::{self, Listing, RecordStatus};
use crate::ui::{self, UiContext};
use chrono::{Local, NaiveDateTime};
use console::style;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Temporary files younger than this may still belong to a live writer
const IN_FLIGHT_GRACE_SECS: i64 = 60;

/// A file `clean` would remove
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    path: PathBuf,
    reason: &'static str,
}

/// Execute the clean command
pub fn execute(args: CleanArgs, config: &Config) -> CkptResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let root = cache_root(&args.root, config);
    let targets = collect_targets(&root, Local::now().naive_local())?;

    if targets.is_empty() {
        ui::step_ok(&ctx, "Nothing to clean");
        return Ok(());
    }

    println!("Found {} file(s) to remove:", targets.len());
    for target in &targets {
        println!(
            "  {} {} ({})",
            style("•").red(),
            target.path.display(),
            target.reason
        );
    }

    if args.dry_run {
        println!();
        println!("Dry run - nothing removed.");
        return Ok(());
    }

    println!();
    if !ui::confirm(&ctx, &format!("Remove {} file(s)?", targets.len()), false)? {
        ui::remark(&ctx, "Aborted. Pass --yes to remove without a prompt.");
        return Ok(());
    }

    let mut removed = 0;
    for target in targets {
        match fs::remove_file(&target.path) {
            Ok(()) => {
                debug!("Removed {}", target.path.display());
                removed += 1;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} already gone", target.path.display());
            }
            Err(e) => {
                return Err(CheckpointError::io(
                    format!("removing {}", target.path.display()),
                    e,
                ))
            }
        }
    }

    ui::step_ok(&ctx, &format!("Removed {} file(s)", removed));
    Ok(())
}

/// Orphaned temporary files and manifest records without an entry
///
/// Published entries are never targets, corrupt ones included.
fn collect_targets(root: &Path, now: NaiveDateTime) -> CkptResult<Vec<Target>> {
    let mut targets = Vec::new();

    for dir in inspect::list_directories(root)? {
        for listing in inspect::list_entries(&dir)? {
            let Listing::Incomplete { path, name } = listing else {
                continue;
            };
            if now.signed_duration_since(name.created_at).num_seconds() < IN_FLIGHT_GRACE_SECS {
                debug!("Skipping {}; publish may still be running", file_name(&path));
                continue;
            }
            targets.push(Target {
                path,
                reason: "interrupted publish",
            });
        }

        for (path, status) in inspect::list_records(&dir)? {
            let reason = match status {
                RecordStatus::Valid(_) => continue,
                RecordStatus::Stale(_) => "stale manifest record",
                RecordStatus::Unreadable(_) => "unreadable manifest record",
            };
            targets.push(Target { path, reason });
        }
    }

    Ok(targets)
}
