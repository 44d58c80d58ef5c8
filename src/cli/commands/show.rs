//! Show command - entries of one computation

use super::{cache_root, directory_label, file_name};
use crate::cli::args::{OutputFormat, ShowArgs};
use crate::config::Config;
use crate::error::{CheckpointError, CkptResult};
use crate::store::inspect::{self, Listing};
use crate::store::CacheDirectory;
use crate::ui::{self, UiContext};
use chrono::NaiveDateTime;
use console::style;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DirectoryView {
    path: String,
    fingerprint: String,
    created_at: String,
    source: Option<String>,
    entries: Vec<EntryView>,
}

#[derive(Debug, Serialize)]
struct EntryView {
    state: &'static str,
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arg_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl EntryView {
    fn from_listing(listing: &Listing) -> Self {
        let file = file_name(listing.path());
        match listing {
            Listing::Valid(entry) => Self {
                state: "valid",
                file,
                args: Some(entry.arg_repr.clone()),
                arg_hash: Some(entry.arg_hash.clone()),
                created_at: Some(timestamp(&entry.created_at)),
                reason: None,
            },
            Listing::Incomplete { name, .. } => Self {
                state: "incomplete",
                file,
                args: Some(name.arg_repr.clone()),
                arg_hash: Some(name.arg_hash.clone()),
                created_at: Some(timestamp(&name.created_at)),
                reason: None,
            },
            Listing::Corrupt { reason, .. } => Self {
                state: "corrupt",
                file,
                args: None,
                arg_hash: None,
                created_at: None,
                reason: Some(reason.clone()),
            },
        }
    }
}

fn timestamp(at: &NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Execute the show command
pub fn execute(args: ShowArgs, config: &Config) -> CkptResult<()> {
    let root = cache_root(&args.root, config);
    let directories: Vec<CacheDirectory> = inspect::list_directories(&root)?
        .into_iter()
        .filter(|dir| dir.identifier == args.identifier)
        .collect();

    if directories.is_empty() {
        return Err(CheckpointError::User(format!(
            "No cache directory for `{}` under {}",
            args.identifier,
            root.display()
        )));
    }

    let views = directories
        .iter()
        .map(|dir| {
            Ok(DirectoryView {
                path: dir.path.display().to_string(),
                fingerprint: dir.fingerprint.clone(),
                created_at: timestamp(&dir.created_at),
                source: dir.find_source().map(|p| p.display().to_string()),
                entries: inspect::list_entries(dir)?
                    .iter()
                    .map(EntryView::from_listing)
                    .collect(),
            })
        })
        .collect::<CkptResult<Vec<_>>>()?;

    match args.format {
        OutputFormat::Table => print_table(&directories, &views),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&views)?),
        OutputFormat::Plain => {
            for (dir, view) in directories.iter().zip(&views) {
                for entry in view.entries.iter().filter(|e| e.state == "valid") {
                    println!("{}", dir.path.join(&entry.file).display());
                }
            }
        }
    }

    Ok(())
}

fn print_table(directories: &[CacheDirectory], views: &[DirectoryView]) {
    let ctx = UiContext::detect();

    for (dir, view) in directories.iter().zip(views) {
        ui::section(&ctx, &directory_label(dir));
        ui::key_value(&ctx, "Directory", &view.path);
        ui::key_value(&ctx, "Created", &view.created_at);
        match &view.source {
            Some(source) => ui::key_value(&ctx, "Source", source),
            None => ui::step_warn(&ctx, "Audit source file is missing"),
        }

        if view.entries.is_empty() {
            ui::remark(&ctx, "no entries");
            continue;
        }

        println!();
        println!(
            "  {:<12} {:<20} {}",
            style("STATE").bold(),
            style("CREATED").bold(),
            style("ARGUMENTS").bold()
        );
        for entry in &view.entries {
            let state = match entry.state {
                "valid" => style(entry.state).green(),
                "incomplete" => style(entry.state).yellow(),
                _ => style(entry.state).red(),
            };
            let detail = entry
                .args
                .as_deref()
                .or(entry.reason.as_deref())
                .unwrap_or_default();
            println!(
                "  {:<12} {:<20} {}",
                state,
                entry.created_at.as_deref().unwrap_or("-"),
                detail
            );
        }
    }
}
