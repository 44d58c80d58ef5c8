//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ckpt - inspect and maintain checkpoint caches
///
/// Lists cache directories and entries, verifies entry names and manifest
/// records, and removes leftovers of interrupted publishes.
#[derive(Parser, Debug)]
#[command(name = "ckpt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CKPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .ckpt.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List cache directories
    List(ListArgs),

    /// Show the entries of one computation
    Show(ShowArgs),

    /// Check entry names and manifest records
    Verify(RootArgs),

    /// Remove interrupted publishes and stale manifest records
    Clean(CleanArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Cache root selection shared by every inspection command
#[derive(Parser, Debug, Default)]
pub struct RootArgs {
    /// Cache root (defaults to cache.root from configuration)
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub root: RootArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Computation identifier (the name it was wrapped under)
    pub identifier: String,

    #[command(flatten)]
    pub root: RootArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the clean command
#[derive(Parser, Debug)]
pub struct CleanArgs {
    #[command(flatten)]
    pub root: RootArgs,

    /// Show what would be removed
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
