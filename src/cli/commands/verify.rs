//! Verify command - check entry names and manifest records

use super::{cache_root, directory_label, file_name};
use crate::cli::args::RootArgs;
use crate::config::Config;
use crate::error::{CheckpointError, CkptResult};
use crate::store::inspect::{self, Listing, RecordStatus};
use crate::store::CacheDirectory;
use crate::ui::{self, UiContext};
use tracing::debug;

/// Counts gathered across a cache root
#[derive(Debug, Default, PartialEq, Eq)]
struct Report {
    directories: usize,
    valid: usize,
    incomplete: usize,
    corrupt: usize,
    stale_records: usize,
    missing_sources: usize,
}

/// Execute the verify command
///
/// Fails when any entry-shaped file has an unparseable name; interrupted
/// publishes and stale manifest records are only warned about.
pub fn execute(args: RootArgs, config: &Config) -> CkptResult<()> {
    let ctx = UiContext::detect();
    let root = cache_root(&args, config);
    let directories = inspect::list_directories(&root)?;

    ui::intro(&ctx, &format!("Verifying {}", root.display()));

    let mut report = Report::default();
    for dir in &directories {
        verify_directory(&ctx, dir, &mut report)?;
    }

    println!();
    ui::key_value(&ctx, "Directories", &report.directories.to_string());
    ui::key_value(&ctx, "Valid entries", &report.valid.to_string());
    ui::key_value(&ctx, "Interrupted publishes", &report.incomplete.to_string());
    ui::key_value(&ctx, "Stale manifest records", &report.stale_records.to_string());
    ui::key_value(&ctx, "Missing audit sources", &report.missing_sources.to_string());
    ui::key_value(&ctx, "Corrupt files", &report.corrupt.to_string());

    if report.corrupt > 0 {
        ui::outro_error(&ctx, "Corrupt checkpoint files found");
        return Err(CheckpointError::VerifyFailed(report.corrupt, root));
    }
    if report.incomplete + report.stale_records > 0 {
        ui::remark(&ctx, "Run: ckpt clean");
    }
    ui::outro_success(&ctx, "All checkpoints verified");
    Ok(())
}

fn verify_directory(ctx: &UiContext, dir: &CacheDirectory, report: &mut Report) -> CkptResult<()> {
    debug!("Verifying {}", dir.path.display());
    report.directories += 1;
    ui::section(ctx, &directory_label(dir));

    let mut clean = true;
    for listing in inspect::list_entries(dir)? {
        match listing {
            Listing::Valid(_) => report.valid += 1,
            Listing::Incomplete { path, .. } => {
                report.incomplete += 1;
                clean = false;
                ui::step_warn_hint(ctx, &file_name(&path), "interrupted publish");
            }
            Listing::Corrupt { path, reason } => {
                report.corrupt += 1;
                clean = false;
                ui::step_error_detail(ctx, &file_name(&path), &reason);
            }
        }
    }

    for (path, status) in inspect::list_records(dir)? {
        match status {
            RecordStatus::Valid(_) => {}
            RecordStatus::Stale(record) => {
                report.stale_records += 1;
                clean = false;
                ui::step_warn_hint(
                    ctx,
                    &format!("manifest record for {}", record.arg_repr),
                    &format!("{} no longer exists", record.entry),
                );
            }
            RecordStatus::Unreadable(reason) => {
                report.stale_records += 1;
                clean = false;
                ui::step_warn_hint(ctx, &file_name(&path), &reason);
            }
        }
    }

    if dir.find_source().is_none() {
        report.missing_sources += 1;
        ui::step_warn(ctx, "audit source file is missing");
    } else if clean {
        ui::step_ok(ctx, "ok");
    }
    Ok(())
}
