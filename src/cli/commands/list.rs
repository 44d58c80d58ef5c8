//! List command - show cache directories under a root

use super::{cache_root, directory_label};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::CkptResult;
use crate::store::inspect::{self, Listing};
use crate::store::CacheDirectory;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DirectorySummary {
    identifier: String,
    fingerprint: String,
    created_at: String,
    entries: usize,
    incomplete: usize,
    path: String,
}

/// Execute the list command
pub fn execute(args: ListArgs, config: &Config) -> CkptResult<()> {
    let root = cache_root(&args.root, config);
    let directories = inspect::list_directories(&root)?;

    if directories.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, &format!("No cache directories under {}", root.display()));
            }
        }
        return Ok(());
    }

    let summaries = directories
        .iter()
        .map(summarize)
        .collect::<CkptResult<Vec<_>>>()?;

    match args.format {
        OutputFormat::Table => print_table(&directories, &summaries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Plain => {
            for summary in &summaries {
                println!("{}", summary.path);
            }
        }
    }

    Ok(())
}

fn summarize(dir: &CacheDirectory) -> CkptResult<DirectorySummary> {
    let listings = inspect::list_entries(dir)?;
    let count = |want: fn(&Listing) -> bool| listings.iter().filter(|l| want(l)).count();

    Ok(DirectorySummary {
        identifier: dir.identifier.clone(),
        fingerprint: dir.fingerprint.clone(),
        created_at: dir.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        entries: count(|l| matches!(l, Listing::Valid(_))),
        incomplete: count(|l| matches!(l, Listing::Incomplete { .. })),
        path: dir.path.display().to_string(),
    })
}

fn print_table(directories: &[CacheDirectory], summaries: &[DirectorySummary]) {
    println!(
        "{:<40} {:<20} {:>8} {:>11}",
        style("COMPUTATION").bold(),
        style("CREATED").bold(),
        style("ENTRIES").bold(),
        style("INCOMPLETE").bold()
    );
    println!("{}", "-".repeat(82));

    for (dir, summary) in directories.iter().zip(summaries) {
        let incomplete = if summary.incomplete > 0 {
            style(summary.incomplete.to_string()).yellow()
        } else {
            style(summary.incomplete.to_string()).dim()
        };
        println!(
            "{:<40} {:<20} {:>8} {:>11}",
            directory_label(dir),
            summary.created_at,
            summary.entries,
            incomplete
        );
    }

    println!();
    println!("{} cache director{}", summaries.len(), if summaries.len() == 1 { "y" } else { "ies" });
}
